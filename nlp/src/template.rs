//! Output templates with variable references.
//!
//! `[name]` substitutes the text captured by variable `name`; `^[name]` feeds
//! that text back through the engine and substitutes the best response.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker placed before a reference to make it recursive.
pub const RECURSIVE_MARKER: char = '^';

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// `[name]`
    Var(String),
    /// `^[name]`
    Recursive(String),
}

/// An output template, split into segments once at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_string(),
            segments: split(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether rendering needs a nested match.
    pub fn is_recursive(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Recursive(_)))
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Template::parse(s)
    }
}

impl From<String> for Template {
    fn from(s: String) -> Self {
        let segments = split(&s);
        Self { source: s, segments }
    }
}

impl From<Template> for String {
    fn from(t: Template) -> Self {
        t.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Splits a template into text and reference segments.
///
/// Brackets that do not enclose a plain name (empty, nested or containing
/// whitespace) are kept as literal text.
fn split(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = source;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };

        let name = &after[..close];
        if name.is_empty() || name.contains('[') || name.contains(char::is_whitespace) {
            text.push_str(&rest[..=open]);
            rest = after;
            continue;
        }

        let mut before = &rest[..open];
        let recursive = before.ends_with(RECURSIVE_MARKER);
        if recursive {
            before = &before[..before.len() - RECURSIVE_MARKER.len_utf8()];
        }
        text.push_str(before);
        if !text.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut text)));
        }

        segments.push(if recursive {
            Segment::Recursive(name.to_string())
        } else {
            Segment::Var(name.to_string())
        });
        rest = &after[close + 1..];
    }

    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}
