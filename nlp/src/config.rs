//! Engine configuration.
//!
//! Configuration can be written in YAML or JSON; every field has a default so
//! an empty document is valid:
//!
//! ```yaml
//! weights:
//!   word: 1.0
//!   variable: 0.75
//!   wildcard: 0.5
//! max_recursion_depth: 8
//! tokenizer:
//!   lowercase: true
//!   lemmas:
//!     running: run
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Match weights per node kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// Weight of a literal word match.
    pub word: f32,
    /// Weight of a token consumed by a variable.
    pub variable: f32,
    /// Weight of a token consumed by a wildcard.
    pub wildcard: f32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            word: 1.0,
            variable: 0.75,
            wildcard: 0.5,
        }
    }
}

/// Options for the built-in [`SimpleTokenizer`](crate::SimpleTokenizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Lowercase words when normalizing.
    pub lowercase: bool,
    /// Normalized word -> lemma dictionary.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub lemmas: HashMap<String, String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            lemmas: HashMap::new(),
        }
    }
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: MatchWeights,
    /// Maximum nesting of recursive `^[var]` expansions.
    pub max_recursion_depth: usize,
    pub tokenizer: TokenizerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            max_recursion_depth: 8,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let cfg: Self = serde_json::from_slice(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        let cfg: Self = serde_yaml::from_slice(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config file, choosing the format by extension (`.json`, else YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json(&data),
            _ => Self::from_yaml(&data),
        }
    }

    /// Checks that weights are usable.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [("word", w.word), ("variable", w.variable), ("wildcard", w.wildcard)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Validation(format!(
                    "weights.{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
