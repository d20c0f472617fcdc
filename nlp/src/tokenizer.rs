//! Tokenizer interface and a simple built-in implementation.
//!
//! Real deployments plug a linguistic tool (lemmatizer, POS tagger) in behind
//! the [`Tokenizer`] trait. [`SimpleTokenizer`] is deterministic and needs no
//! external data beyond an optional lemma dictionary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TokenizerConfig;
use crate::word::Word;

/// Splits raw text into normalized words.
///
/// Implementations must be deterministic: the same text always yields the same
/// words. Symbols must be kept in the output; the compiler and matcher filter
/// them where needed.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Word>;
}

/// Variables, wildcards, words with inner apostrophes, then any single symbol.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\[\]\s]+\]|[*+]|[\p{L}\p{N}_]+(?:'[\p{L}\p{N}_]+)*|\S")
        .expect("token regex is valid")
});

/// Whitespace and punctuation based tokenizer with dictionary lemmas.
#[derive(Debug, Clone, Default)]
pub struct SimpleTokenizer {
    config: TokenizerConfig,
}

impl SimpleTokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    fn make_word(&self, original: &str) -> Word {
        let normalized = if self.config.lowercase {
            original.to_lowercase()
        } else {
            original.to_string()
        };
        let lemma = self
            .config
            .lemmas
            .get(&normalized)
            .cloned()
            .unwrap_or_else(|| normalized.clone());
        Word::new(original, normalized, lemma, "")
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Word> {
        let mut words = Vec::new();
        for chunk in text.split_whitespace() {
            // 'quoted' chunks stay whole so exact-match quoting survives
            if chunk.len() >= 3 && chunk.starts_with('\'') && chunk.ends_with('\'') {
                words.push(self.make_word(chunk));
                continue;
            }
            for m in TOKEN_RE.find_iter(chunk) {
                words.push(self.make_word(m.as_str()));
            }
        }
        words
    }
}
