//! Error taxonomy for mlgate.
//!
//! Findings are the product of an evaluation and never appear here. Errors
//! are reserved for inputs the engine cannot evaluate at all (`InputError`)
//! and for threshold overrides rejected at construction time (`ConfigError`).

/// A document could not be turned into an evaluable tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("failed to parse {format} document: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("document root must be a mapping, found {found}")]
    NotAnObject { found: &'static str },
}

/// A threshold override was rejected before any evaluation ran.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("threshold {field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("inconsistent thresholds: {0}")]
    Inconsistent(String),

    #[error("approved set {field} must not be empty")]
    EmptySet { field: &'static str },
}

/// Umbrella error for library entry points that touch the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum MlgateError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mlgate library operations.
pub type Result<T> = std::result::Result<T, MlgateError>;
