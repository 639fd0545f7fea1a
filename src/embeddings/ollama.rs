//! Embedder backed by a local Ollama server
//!
//! Sends batches to `POST {endpoint}/api/embed` and checks every returned
//! vector against the pinned dimension.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::config::EmbeddingConfig;
use super::error::{EmbeddingError, EmbeddingResult};
use super::Embedder;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

/// HTTP embedder for Ollama's `/api/embed`
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OllamaEmbedder {
    /// Create an embedder from configuration
    pub fn new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::ConfigError {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url: format!("{}/api/embed", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        })
    }

    async fn embed_chunk(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::BackendUnavailable {
                reason: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let parsed: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    reason: format!("Failed to parse response: {}", e),
                })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    parsed.embeddings.len()
                ),
            });
        }

        for vector in &parsed.embeddings {
            if vector.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_chunk(batch).await?);
        }

        tracing::debug!(
            model = %self.model,
            texts = texts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Embedded batch via Ollama"
        );

        Ok(vectors)
    }
}
