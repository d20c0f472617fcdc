//! chattest - chat with a rule set and run its regression tests.

mod rules;
mod runner;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use parley_nlp::{Engine, EngineConfig, MatchResult, Rule};
use tracing_subscriber::EnvFilter;

/// Chat with a rule set and run its regression tests.
#[derive(Parser, Debug)]
#[command(name = "chattest")]
#[command(about = "Chat with a rule set and run its regression tests")]
struct Args {
    /// Rule file or directory (walked for .json/.yaml/.yml files)
    #[arg(long)]
    rules: PathBuf,

    /// Engine config file (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer a single utterance and exit
    #[arg(long)]
    input: Option<String>,

    /// Print every ranked response instead of the best one
    #[arg(long)]
    all: bool,

    /// Print responses as JSON
    #[arg(long)]
    json: bool,

    /// Run the tests declared in the rule files
    #[arg(long)]
    test: bool,

    /// Output JSON test report to file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the compiled tree and exit
    #[arg(long)]
    dump_tree: bool,

    /// Quiet mode (less output)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    // Load rules and tests
    let rule_files = rules::load_rules(&args.rules)?;
    let mut rules = Vec::new();
    let mut cases = Vec::new();
    for rf in rule_files {
        cases.extend(rf.cases());
        rules.push(rf.rule);
    }

    if !args.quiet {
        eprintln!("=== Loaded {} rules, {} tests ===", rules.len(), cases.len());
    }

    let engine = compile(config, &rules);

    if args.dump_tree {
        println!("{}", engine.tree());
        return Ok(());
    }

    if args.test {
        let report = runner::run(&engine, &cases);
        if !args.quiet {
            runner::print_summary(&report);
        }
        if let Some(output) = &args.output {
            runner::save_report(&report, output)?;
            if !args.quiet {
                println!("\nReport saved to {}", output.display());
            }
        }
        if !report.all_passed() {
            anyhow::bail!("{} of {} tests failed", report.failed, report.test_count);
        }
        return Ok(());
    }

    if let Some(input) = &args.input {
        let results = engine.match_input(input);
        println!("{}", render(&results, args.all, args.json)?);
        return Ok(());
    }

    // Interactive: one utterance per line
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    if !args.quiet {
        print!("> ");
        stdout.flush()?;
    }
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            let results = engine.match_input(line);
            println!("{}", render(&results, args.all, args.json)?);
        }
        if !args.quiet {
            print!("> ");
            stdout.flush()?;
        }
    }

    Ok(())
}

fn compile(config: EngineConfig, rules: &[Rule]) -> Engine {
    let mut engine = Engine::new(config);
    engine.compile(rules);
    engine
}

/// Formats responses for the terminal.
fn render(results: &[MatchResult], all: bool, json: bool) -> Result<String> {
    let shown = if all {
        results
    } else {
        &results[..results.len().min(1)]
    };

    if json {
        let out = if all {
            serde_json::to_string(shown)?
        } else {
            match shown.first() {
                Some(r) => serde_json::to_string(r)?,
                None => "null".to_string(),
            }
        };
        return Ok(out);
    }

    if shown.is_empty() {
        return Ok("(no match)".to_string());
    }
    if !all {
        return Ok(shown[0].text.clone());
    }

    let lines: Vec<String> = shown
        .iter()
        .map(|r| format!("{:>8.2}  {:>6}:{:<2} {}", r.score, r.rule_id, r.input_index, r.text))
        .collect();
    Ok(lines.join("\n"))
}
