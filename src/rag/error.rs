//! Error types for the RAG session

use thiserror::Error;

use crate::core::error::ConfigError;
use crate::embeddings::EmbeddingError;
use crate::extract::ExtractionError;
use crate::gateway::ModelError;
use crate::vector::VectorError;

/// Result type for session operations
pub type RagResult<T> = Result<T, RagError>;

/// Session errors. User-input errors come first; the rest wrap the
/// collaborator that failed.
#[derive(Error, Debug)]
pub enum RagError {
    /// A question was asked before any documents were ingested or loaded
    #[error("Documents have not been processed yet")]
    DocumentsNotProcessed,

    /// Required user text was empty or whitespace
    #[error("Empty input: {field}")]
    EmptyInput { field: &'static str },

    #[error("No documents supplied")]
    NoDocuments,

    /// Documents were read but yielded no text to index
    #[error("Documents contain no extractable text")]
    NoContent,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] VectorError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RagError {
    /// Whether the caller caused the error and can fix it by changing input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RagError::DocumentsNotProcessed
                | RagError::EmptyInput { .. }
                | RagError::NoDocuments
                | RagError::NoContent
        )
    }
}
