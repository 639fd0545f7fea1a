//! Text chunking for embedding
//!
//! Splits extracted document text into overlapping, character-counted
//! segments. Chunk ends prefer natural boundaries (paragraph, sentence, line,
//! word) and fall back to a hard cut only when no boundary fits.

mod splitter;


pub use splitter::{split, BoundaryLevel, Chunker, TextChunk};

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// Chunk size and overlap, both counted in characters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target maximum length of a chunk
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            chunk_overlap: 1_000,
        }
    }
}

impl ChunkingConfig {
    /// Reject sizes that could not make progress
    pub fn validate(&self) -> ConfigResult<()> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }
}
