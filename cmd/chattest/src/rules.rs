//! Rule file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parley_nlp::{Rule, RuleId};
use serde::Deserialize;
use tracing::debug;

use crate::runner::TestCase;

/// A rule file: one rule plus optional regression tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFile {
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(default)]
    pub tests: Vec<TestDef>,
}

/// Test definition within a rule file.
#[derive(Debug, Clone, Deserialize)]
pub struct TestDef {
    pub input: String,
    /// Expected response text.
    #[serde(default)]
    pub expect: Option<String>,
    /// Expected rule id, defaults to the rule of the file.
    #[serde(default)]
    pub rule: Option<RuleId>,
}

impl RuleFile {
    /// Parse a rule file, choosing the format by extension.
    pub fn from_slice(data: &[u8], ext: &str) -> Result<Self> {
        let rf: RuleFile = match ext {
            "json" => serde_json::from_slice(data)?,
            _ => serde_yaml::from_slice(data)?,
        };
        rf.rule.validate()?;
        Ok(rf)
    }

    /// Turns the `tests:` entries into runnable cases.
    pub fn cases(&self) -> Vec<TestCase> {
        self.tests
            .iter()
            .map(|t| TestCase {
                input: t.input.clone(),
                rule: Some(t.rule.unwrap_or(self.rule.id)),
                text: t.expect.clone(),
            })
            .collect()
    }
}

/// Loads a single rule file, or every rule file below a directory.
///
/// Files are read in path order so that compile order is reproducible.
pub fn load_rules(path: &Path) -> Result<Vec<RuleFile>> {
    let paths = if path.is_dir() {
        let mut paths = walkdir(path)?;
        paths.sort();
        paths
    } else {
        vec![path.to_path_buf()]
    };

    let mut rule_files = Vec::new();
    for path in paths {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        if ext != "json" && ext != "yaml" && ext != "yml" {
            continue;
        }

        let data = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let rf = RuleFile::from_slice(&data, ext)
            .with_context(|| format!("parse {}", path.display()))?;
        debug!("loaded rule {} from {}", rf.rule.id, path.display());
        rule_files.push(rf);
    }

    Ok(rule_files)
}

/// Simple directory walk.
fn walkdir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    fn walk(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(&path, paths)?;
            } else {
                paths.push(path);
            }
        }
        Ok(())
    }

    walk(dir, &mut paths)?;
    Ok(paths)
}
