//! Error types for rule and configuration loading.
//!
//! Matching itself never fails: no match, failed expansions and pruned loops
//! all degrade to fewer results. Errors only come from decoding rule files
//! and engine configuration.

use thiserror::Error;

/// Error type for parley-nlp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a rule or config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A condition string could not be parsed.
    #[error("invalid condition {0:?}: expected [var], ![var], [var] = value or [var] != value")]
    InvalidCondition(String),

    /// A rule or config value is out of range.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for parley-nlp operations.
pub type Result<T> = std::result::Result<T, Error>;
