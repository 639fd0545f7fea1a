//! Deterministic feature-hashing embedder
//!
//! Every lowercased alphanumeric token is hashed with blake3 into a signed
//! bucket; the bucket counts are L2-normalized. Texts sharing words end up
//! with positive cosine similarity, which is enough for offline use and tests.

use async_trait::async_trait;

use super::error::{EmbeddingError, EmbeddingResult};
use super::Embedder;

/// Feature-hashing embedder with a fixed dimension
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> EmbeddingResult<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::ConfigError {
                reason: "dimension must be positive".to_string(),
            });
        }
        Ok(Self {
            dimension,
            model_id: format!("hashing-{}", dimension),
        })
    }

    /// Embed a single text synchronously
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[..8]);
            let value = u64::from_le_bytes(word);

            let bucket = (value % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_sync(text)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
