//! Conditions guarding rule outputs.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::capture::CaptureStack;
use crate::error::Error;

static CONDITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(!)?\s*\[([^\[\]\s]+)\]\s*(?:(!=|=)\s*(.*?))?$").expect("condition regex is valid")
});

/// A predicate over the captured variables.
///
/// String forms: `""` (always), `[var]`, `![var]`, `[var] = value`,
/// `[var] != value`. Value comparisons ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    #[default]
    Always,
    Bound(String),
    Unbound(String),
    Equals(String, String),
    NotEquals(String, String),
}

impl Condition {
    /// Parses the string form of a condition.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Condition::Always);
        }

        let caps = CONDITION_RE
            .captures(s)
            .ok_or_else(|| Error::InvalidCondition(s.to_string()))?;
        let negated = caps.get(1).is_some();
        let var = caps[2].to_string();

        match (negated, caps.get(3).map(|m| m.as_str())) {
            (false, None) => Ok(Condition::Bound(var)),
            (true, None) => Ok(Condition::Unbound(var)),
            (false, Some(op)) => {
                let value = caps.get(4).map_or("", |m| m.as_str()).to_string();
                if value.starts_with('=') {
                    return Err(Error::InvalidCondition(s.to_string()));
                }
                if op == "=" {
                    Ok(Condition::Equals(var, value))
                } else {
                    Ok(Condition::NotEquals(var, value))
                }
            }
            (true, Some(_)) => Err(Error::InvalidCondition(s.to_string())),
        }
    }

    /// Evaluates the condition against the current captures.
    pub fn holds(&self, captures: &CaptureStack<'_>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Bound(var) => captures.is_bound(var),
            Condition::Unbound(var) => !captures.is_bound(var),
            Condition::Equals(var, value) => same_value(&captures.value(var), value),
            Condition::NotEquals(var, value) => !same_value(&captures.value(var), value),
        }
    }
}

fn same_value(captured: &str, expected: &str) -> bool {
    captured.trim().to_lowercase() == expected.trim().to_lowercase()
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

impl TryFrom<String> for Condition {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Condition::parse(&s)
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => Ok(()),
            Condition::Bound(var) => write!(f, "[{var}]"),
            Condition::Unbound(var) => write!(f, "![{var}]"),
            Condition::Equals(var, value) => write!(f, "[{var}] = {value}"),
            Condition::NotEquals(var, value) => write!(f, "[{var}] != {value}"),
        }
    }
}
