//! Error types for flatfinder.

use thiserror::Error;

/// Result type alias using flatfinder's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for flatfinder operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Intent extraction / generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),
}

impl Error {
    /// Whether this error comes from an external collaborator (store, embedding
    /// oracle, intent oracle, network) rather than from caller input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Embedding(_) | Error::Inference(_) | Error::Request(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
