//! Error types for the embedding layer

use thiserror::Error;

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors that can occur during embedding operations
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Embedding backend could not be reached or refused the request
    #[error("Embedding backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// Backend answered with something that is not a usable embedding
    #[error("Invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    /// Vector length differs from the pinned model dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted vectors were produced by a different model
    #[error("Embedding model mismatch: index built with {stored}, active model is {active}")]
    ModelMismatch { stored: String, active: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::BackendUnavailable {
            reason: err.to_string(),
        }
    }
}
