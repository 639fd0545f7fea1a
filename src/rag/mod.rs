//! RAG Orchestration Module
//!
//! Wires chunker, vector index, prompt builder and model into the
//! user-facing flows:
//! - Document ingestion and resumption from a persisted index
//! - Document questions answered from retrieved context
//! - Party recommendation from a free-text profile (no retrieval)
//! - Role-play chat under a task-specific system prompt

mod error;
mod session;


pub use error::{RagError, RagResult};
pub use session::{DocAnswer, RagSession, RoleChat};
