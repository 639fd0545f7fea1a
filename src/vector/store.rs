//! VectorIndex implementation
//!
//! Exact cosine search over an in-memory snapshot, persisted to a directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::VectorIndexConfig;
use super::error::{VectorError, VectorResult};
use super::persist::{
    self, IndexManifest, PersistedEntry, PersistedIndex, ReadError, FORMAT_VERSION,
    MISMATCH_RETRIES, MISMATCH_RETRY_DELAY,
};
use crate::embeddings::{cosine_similarity, Embedder, EmbeddingError};

/// Explicit opt-in to deserializing persisted index state.
///
/// The only constructor is [`TrustAcknowledgement::accept_deserialization_risk`],
/// so every load site names the risk it accepts.
#[derive(Debug, Clone, Copy)]
pub struct TrustAcknowledgement {
    _private: (),
}

impl TrustAcknowledgement {
    /// Accept that the index directory is trusted input
    pub fn accept_deserialization_risk() -> Self {
        Self { _private: () }
    }
}

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Chunk text as indexed
    pub text: String,
    /// Cosine similarity to the query, higher is closer
    pub score: f32,
    /// Insertion position of the chunk
    pub position: usize,
}

#[derive(Debug)]
struct IndexState {
    index_id: Uuid,
    model_id: String,
    dimension: usize,
    created_at: DateTime<Utc>,
    entries: Vec<PersistedEntry>,
}

/// Immutable, cheaply cloneable snapshot of a built or loaded index
#[derive(Debug, Clone)]
pub struct IndexHandle {
    state: Arc<IndexState>,
}

impl IndexHandle {
    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    /// Embedding model the vectors were produced with
    pub fn model_id(&self) -> &str {
        &self.state.model_id
    }

    pub fn dimension(&self) -> usize {
        self.state.dimension
    }

    /// Identifier written to the manifest at build time
    pub fn index_id(&self) -> Uuid {
        self.state.index_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.state.created_at
    }

    /// Chunk texts in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.state.entries.iter().map(|e| e.text.as_str())
    }

    /// Top `k` chunks by cosine similarity to `query`, best first.
    ///
    /// Equal scores keep insertion order. Fewer than `k` chunks returns all.
    pub fn search_vector(&self, query: &[f32], k: usize) -> VectorResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(VectorError::InvalidK { k });
        }
        if query.len() != self.state.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.state.dimension,
                actual: query.len(),
            }
            .into());
        }

        let mut scored: Vec<(usize, f32)> = self
            .state
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.vector)))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(position, score)| ScoredChunk {
                text: self.state.entries[position].text.clone(),
                score,
                position,
            })
            .collect())
    }
}

/// Builds, persists, loads and queries the chunk index at one path.
///
/// `build` takes the write lock and `load` the read lock, so a load never
/// observes a half-written directory from the same process. The lock does not
/// reach other processes: there `load` relies on the manifest being renamed
/// last and re-reads while `index.bin` and the manifest disagree.
pub struct VectorIndex {
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    lock: RwLock<()>,
}

impl VectorIndex {
    pub fn new(path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            path: path.into(),
            embedder,
            lock: RwLock::new(()),
        }
    }

    pub fn from_config(config: &VectorIndexConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(config.path.clone(), embedder)
    }

    /// Directory the index is persisted to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embed every chunk, persist the result over any previous index and
    /// return a handle that can be queried without reloading.
    pub async fn build(&self, chunks: &[String]) -> VectorResult<IndexHandle> {
        if chunks.is_empty() {
            return Err(VectorError::EmptyIndex);
        }

        let _guard = self.lock.write().await;
        let start = Instant::now();

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    vectors.len()
                ),
            }
            .into());
        }

        let dimension = self.embedder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            }
            .into());
        }

        let persisted = PersistedIndex {
            format_version: FORMAT_VERSION,
            model_id: self.embedder.model_id().to_string(),
            dimension,
            entries: chunks
                .iter()
                .zip(vectors)
                .map(|(text, vector)| PersistedEntry {
                    text: text.clone(),
                    vector,
                })
                .collect(),
        };

        let manifest = persist::write_index(&self.path, &persisted)?;

        info!(
            path = %self.path.display(),
            index_id = %manifest.index_id,
            chunks = manifest.chunk_count,
            model = %manifest.model_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Vector index built"
        );

        Ok(IndexHandle {
            state: Arc::new(IndexState {
                index_id: manifest.index_id,
                model_id: persisted.model_id,
                dimension,
                created_at: manifest.created_at,
                entries: persisted.entries,
            }),
        })
    }

    /// Reconstruct the persisted index. Never returns a partial handle.
    pub async fn load(&self, _trust: TrustAcknowledgement) -> VectorResult<IndexHandle> {
        let _guard = self.lock.read().await;
        let start = Instant::now();

        let (manifest, persisted) = self.read_settled().await?;

        if persisted.model_id != self.embedder.model_id() {
            return Err(EmbeddingError::ModelMismatch {
                stored: persisted.model_id,
                active: self.embedder.model_id().to_string(),
            }
            .into());
        }
        if persisted.dimension != self.embedder.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.embedder.dimension(),
                actual: persisted.dimension,
            }
            .into());
        }

        info!(
            path = %self.path.display(),
            index_id = %manifest.index_id,
            chunks = manifest.chunk_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Vector index loaded"
        );

        Ok(IndexHandle {
            state: Arc::new(IndexState {
                index_id: manifest.index_id,
                model_id: persisted.model_id,
                dimension: persisted.dimension,
                created_at: manifest.created_at,
                entries: persisted.entries,
            }),
        })
    }

    /// Read the persisted files, waiting out a writer in another process that
    /// has renamed `index.bin` but not yet the manifest
    async fn read_settled(&self) -> VectorResult<(IndexManifest, PersistedIndex)> {
        let mut attempt = 0;
        loop {
            match persist::read_index(&self.path) {
                Ok(read) => return Ok(read),
                Err(ReadError::Mismatch) if attempt < MISMATCH_RETRIES => {
                    attempt += 1;
                    debug!(
                        path = %self.path.display(),
                        attempt,
                        "Index files out of step, retrying"
                    );
                    tokio::time::sleep(MISMATCH_RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into_error(&self.path)),
            }
        }
    }

    /// Embed `query` with the pinned model and return the `k` nearest chunks
    pub async fn search(
        &self,
        handle: &IndexHandle,
        query: &str,
        k: usize,
    ) -> VectorResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(VectorError::InvalidK { k });
        }
        if handle.model_id() != self.embedder.model_id() {
            return Err(EmbeddingError::ModelMismatch {
                stored: handle.model_id().to_string(),
                active: self.embedder.model_id().to_string(),
            }
            .into());
        }

        let query_vector = self.embedder.embed(query).await?;
        let results = handle.search_vector(&query_vector, k)?;

        debug!(
            k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "Search completed"
        );

        Ok(results)
    }
}
