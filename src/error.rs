//! Error types for trajectory evaluation

use thiserror::Error;

/// Main error type for trajectory evaluation
#[derive(Error, Debug)]
pub enum EvalError {
    // Matcher errors
    #[error("Trajectory match requires both outputs and reference outputs")]
    MissingInput,

    #[error(
        "Invalid trajectory match mode: `{0}`. \
         Must be one of `strict`, `unordered`, `subset`, or `superset`"
    )]
    InvalidMatchMode(String),

    // Extractor errors
    #[error("No checkpoint history recorded for thread '{0}'")]
    ThreadNotFound(String),

    #[error("Unsupported history shape: {0}")]
    UnsupportedShape(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::Serialization(e.to_string())
    }
}

/// Result type alias for trajectory evaluation
pub type EvalResult<T> = Result<T, EvalError>;
