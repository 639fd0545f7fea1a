//! Vector index error types

use std::path::PathBuf;

use thiserror::Error;

use crate::embeddings::EmbeddingError;

/// Result type for vector index operations
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector index specific errors
#[derive(Error, Debug)]
pub enum VectorError {
    /// Nothing usable at the index path: missing, unreadable, or corrupt
    #[error("Vector index not found at {path}: {reason}")]
    IndexNotFound { path: PathBuf, reason: String },

    /// Writing the index to disk failed
    #[error("Failed to persist vector index: {reason}")]
    Persistence { reason: String },

    /// Loading persisted state was attempted without accepting the risk
    #[error("Loading the persisted index at {path} requires explicit trust")]
    LoadNotAcknowledged { path: PathBuf },

    #[error("Retrieval depth must be positive, got {k}")]
    InvalidK { k: usize },

    #[error("Cannot build an index from zero chunks")]
    EmptyIndex,

    /// Embedding failed or produced vectors incompatible with the index
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl VectorError {
    pub(crate) fn not_found(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        VectorError::IndexNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(reason: impl Into<String>) -> Self {
        VectorError::Persistence {
            reason: reason.into(),
        }
    }
}
