// crates/scribe-server/src/error.rs
// Standardized error types for Scribe

use thiserror::Error;

/// Main error type for the Scribe library
#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown error: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using ScribeError
pub type Result<T> = std::result::Result<T, ScribeError>;

impl From<String> for ScribeError {
    fn from(s: String) -> Self {
        ScribeError::Other(s)
    }
}

impl From<tokio::task::JoinError> for ScribeError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            ScribeError::Cancelled
        } else {
            ScribeError::Other(err.to_string())
        }
    }
}

impl From<ScribeError> for String {
    fn from(err: ScribeError) -> Self {
        err.to_string()
    }
}
