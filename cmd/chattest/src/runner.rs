//! Regression runner for rule file tests.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use parley_nlp::{Engine, MatchResult, RuleId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Test case with input and expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    /// Expected rule id of the best response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleId>,
    /// Expected text of the best response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Result of running one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub input: String,
    pub expected: TestCase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<MatchResult>,
    pub duration_us: i64,
    pub status: String, // "pass", "fail"
}

/// Full test report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestReport {
    pub timestamp: String,
    pub rule_count: usize,
    pub test_count: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub cases: Vec<CaseResult>,
}

impl TestReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs every case against `engine`.
pub fn run(engine: &Engine, cases: &[TestCase]) -> TestReport {
    let mut report = TestReport {
        timestamp: Utc::now().to_rfc3339(),
        rule_count: engine.rule_count(),
        test_count: cases.len(),
        ..Default::default()
    };

    for tc in cases {
        let cr = run_single_test(engine, tc);
        match cr.status.as_str() {
            "pass" => report.passed += 1,
            _ => report.failed += 1,
        }
        report.cases.push(cr);
    }

    if report.test_count > 0 {
        report.pass_rate = report.passed as f64 / report.test_count as f64 * 100.0;
    }
    report
}

fn run_single_test(engine: &Engine, tc: &TestCase) -> CaseResult {
    let start = Instant::now();
    let actual = engine.best_match(&tc.input);
    let duration_us = start.elapsed().as_micros() as i64;

    let status = compare_results(tc, actual.as_ref());
    debug!("test {:?}: {}", tc.input, status);

    CaseResult {
        input: tc.input.clone(),
        expected: tc.clone(),
        actual,
        duration_us,
        status,
    }
}

/// A case passes when the best response has the expected rule and text.
fn compare_results(expected: &TestCase, actual: Option<&MatchResult>) -> String {
    let Some(actual) = actual else {
        return "fail".to_string();
    };

    if expected.rule.is_some_and(|id| id != actual.rule_id) {
        return "fail".to_string();
    }
    if expected.text.as_deref().is_some_and(|text| text != actual.text) {
        return "fail".to_string();
    }

    "pass".to_string()
}

/// Save report to file.
pub fn save_report(report: &TestReport, path: &Path) -> Result<()> {
    let data = serde_json::to_string_pretty(report)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Print test summary.
pub fn print_summary(report: &TestReport) {
    println!("\n{}", "=".repeat(100));
    println!("TEST SUMMARY ({} rules, {})", report.rule_count, report.timestamp);
    println!("{}", "=".repeat(100));

    println!(
        "\n{:<6} {:<36} {:<36} {:>8} {:>10}",
        "Status", "Input", "Response", "Rule", "Time(us)"
    );
    println!("{}", "-".repeat(100));

    for cr in &report.cases {
        let (text, rule) = match &cr.actual {
            Some(r) => (r.text.as_str(), r.rule_id.to_string()),
            None => ("(no match)", "-".to_string()),
        };
        println!(
            "{:<6} {:<36} {:<36} {:>8} {:>10}",
            cr.status,
            truncate(&cr.input, 36),
            truncate(text, 36),
            rule,
            cr.duration_us
        );
    }

    println!("{}", "-".repeat(100));
    println!(
        "Total {}  Passed {}  Failed {}  PassRate {:.1}%",
        report.test_count, report.passed, report.failed, report.pass_rate
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
