//! Normalized word records produced by a tokenizer.

use std::fmt;

/// Marker for a zero-or-more wildcard.
pub const STAR_OP: &str = "*";

/// Marker for a one-or-more wildcard.
pub const PLUS_OP: &str = "+";

/// How many tokens a wildcard must consume at least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// `*`: matches zero or more tokens.
    ZeroOrMore,
    /// `+`: matches one or more tokens.
    OneOrMore,
}

impl Quantifier {
    /// Minimum number of tokens consumed.
    pub fn min_occurs(self) -> usize {
        match self {
            Quantifier::ZeroOrMore => 0,
            Quantifier::OneOrMore => 1,
        }
    }

    /// The marker used in rule text.
    pub fn marker(self) -> &'static str {
        match self {
            Quantifier::ZeroOrMore => STAR_OP,
            Quantifier::OneOrMore => PLUS_OP,
        }
    }
}

/// Classification of a word, derived from its original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WordKind {
    Literal,
    Wildcard(Quantifier),
    /// Bracketed variable; holds the name without brackets.
    Variable(String),
    Symbol,
}

/// A single token with its normalized forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    /// Text as it appeared in the input.
    pub original: String,
    /// Normalized text (typically lowercased).
    pub normalized: String,
    /// Dictionary form. Empty disables lemma matching.
    pub lemma: String,
    /// Part-of-speech tag, empty when unknown.
    pub pos_tag: String,
    pub kind: WordKind,
}

impl Word {
    /// Creates a word whose kind is derived from `original`.
    pub fn new(
        original: impl Into<String>,
        normalized: impl Into<String>,
        lemma: impl Into<String>,
        pos_tag: impl Into<String>,
    ) -> Self {
        let original = original.into();
        let kind = classify(&original);
        Self {
            original,
            normalized: normalized.into(),
            lemma: lemma.into(),
            pos_tag: pos_tag.into(),
            kind,
        }
    }

    /// Creates a word with every form equal to `text`.
    pub fn plain(text: &str) -> Self {
        Self::new(text, text, text, "")
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self.kind, WordKind::Symbol)
    }

    /// Two literal words denote the same tree node.
    pub fn same_literal(&self, other: &Word) -> bool {
        self.normalized == other.normalized && self.lemma == other.lemma
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lemma.is_empty() || self.lemma == self.normalized {
            write!(f, "{}", self.normalized)
        } else {
            write!(f, "{}/{}", self.normalized, self.lemma)
        }
    }
}

/// Derives the word kind from its original text.
fn classify(original: &str) -> WordKind {
    match original {
        STAR_OP => return WordKind::Wildcard(Quantifier::ZeroOrMore),
        PLUS_OP => return WordKind::Wildcard(Quantifier::OneOrMore),
        _ => {}
    }

    if original.len() >= 3 && original.starts_with('[') && original.ends_with(']') {
        let name = &original[1..original.len() - 1];
        if !name.contains(['[', ']']) {
            return WordKind::Variable(name.to_string());
        }
    }

    if !original.is_empty() && !original.chars().any(|c| c.is_alphanumeric() || c == '_') {
        return WordKind::Symbol;
    }

    WordKind::Literal
}
