//! Embedding layer for Polis RAG
//!
//! Turns chunk and query text into fixed-dimension vectors:
//! - `OllamaEmbedder` calls a local Ollama server (all-MiniLM-L6-v2, 384 dimensions)
//! - `HashingEmbedder` is a deterministic offline fallback
//!
//! The embedder is built once per process and shared, so queries do not pay
//! for re-creating the model client.

mod config;
mod error;
mod hashing;
mod ollama;


pub use config::{EmbeddingConfig, EmbeddingProvider};
pub use error::{EmbeddingError, EmbeddingResult};
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;

use std::sync::Arc;

use async_trait::async_trait;

/// A pinned embedding model
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the model producing the vectors
    fn model_id(&self) -> &str;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed several texts, preserving order
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                reason: "backend returned no embedding".to_string(),
            })
    }
}

/// Build the configured embedder
pub fn from_config(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimension)?),
    };

    tracing::info!(
        provider = ?config.provider,
        model = embedder.model_id(),
        dimension = embedder.dimension(),
        "Embedding model ready"
    );

    Ok(embedder)
}

/// Cosine similarity between two vectors; 0.0 when either is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
