//! Configuration for the embedding layer

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// Which embedder implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama server (`/api/embed`)
    #[default]
    Ollama,
    /// Offline feature hashing; no model download required
    Hashing,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedder implementation
    pub provider: EmbeddingProvider,

    /// Pinned model identifier (Ollama packaging of all-MiniLM-L6-v2)
    pub model: String,

    /// Base URL of the Ollama server
    pub endpoint: String,

    /// Vector dimension produced by the model (384 for MiniLM-L6)
    pub dimension: usize,

    /// Texts sent per request
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "all-minilm".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            dimension: 384,
            batch_size: 32,
            request_timeout_secs: 60,
        }
    }
}

impl EmbeddingConfig {
    /// Offline configuration backed by the hashing embedder
    pub fn hashing(dimension: usize) -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            dimension,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.dimension == 0 {
            return Err(invalid("embedding.dimension", self.dimension));
        }
        if self.batch_size == 0 {
            return Err(invalid("embedding.batch_size", self.batch_size));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid(
                "embedding.request_timeout_secs",
                self.request_timeout_secs,
            ));
        }
        if self.model.trim().is_empty() {
            return Err(invalid("embedding.model", "\"\""));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
