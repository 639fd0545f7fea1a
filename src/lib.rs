//! Polis RAG - retrieval-augmented analysis of German political documents
//!
//! This crate provides the core functionality for Polis RAG including:
//! - Overlapping, boundary-aware text chunking
//! - A persisted vector index with exact cosine search
//! - Bounded invocation of a local inference backend
//! - Per-language prompt templates
//! - Document ingestion, question answering and party recommendation

pub mod chunker;
pub mod core;
pub mod embeddings;
pub mod extract;
pub mod gateway;
pub mod logging;
pub mod prompt;
pub mod rag;
pub mod vector;

// Re-export commonly used items
pub use crate::core::config::AppConfig;
pub use crate::core::error::{PolisError, Result};
pub use crate::core::Language;
pub use chunker::Chunker;
pub use embeddings::Embedder;
pub use gateway::{LanguageModel, ModelError, ModelGateway};
pub use prompt::{PromptBuilder, TaskKind};
pub use rag::{DocAnswer, RagError, RagSession, RoleChat};
pub use vector::{TrustAcknowledgement, VectorError, VectorIndex};
