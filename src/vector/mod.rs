//! Vector index module
//!
//! Embeds chunks, persists them to a directory and answers top-k
//! nearest-neighbour queries by exact cosine similarity. Loading a persisted
//! index needs a [`TrustAcknowledgement`].

mod config;
mod error;
mod persist;
mod store;

#[cfg(test)]
mod tests;

pub use config::VectorIndexConfig;
pub use error::{VectorError, VectorResult};
pub use persist::IndexManifest;
pub use store::{IndexHandle, ScoredChunk, TrustAcknowledgement, VectorIndex};
