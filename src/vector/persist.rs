//! On-disk layout of the vector index
//!
//! ```text
//! <index dir>/
//!   index.bin      bincode: format version, model, dimension, entries
//!   manifest.json  id, model, dimension, chunk count, timestamp, blake3 checksum
//! ```
//!
//! Both files are written to a temp file and renamed into place. The
//! manifest goes last, so the two files only disagree while a writer is
//! between its renames or after it crashed there. Readers retry a mismatch
//! for [`MISMATCH_RETRIES`] x [`MISMATCH_RETRY_DELAY`] before giving up.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{VectorError, VectorResult};

pub(crate) const INDEX_FILE: &str = "index.bin";
pub(crate) const MANIFEST_FILE: &str = "manifest.json";
pub(crate) const FORMAT_VERSION: u32 = 1;

pub(crate) const MISMATCH_RETRIES: u32 = 10;
pub(crate) const MISMATCH_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Why a read produced no index
#[derive(Debug)]
pub(crate) enum ReadError {
    /// `index.bin` does not match the manifest checksum
    Mismatch,
    Invalid(VectorError),
}

impl ReadError {
    pub(crate) fn into_error(self, dir: &Path) -> VectorError {
        match self {
            ReadError::Mismatch => VectorError::not_found(dir, "checksum mismatch"),
            ReadError::Invalid(error) => error,
        }
    }
}

impl From<VectorError> for ReadError {
    fn from(error: VectorError) -> Self {
        ReadError::Invalid(error)
    }
}

/// One stored chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedEntry {
    pub text: String,
    pub vector: Vec<f32>,
}

/// Body of `index.bin`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedIndex {
    pub format_version: u32,
    pub model_id: String,
    pub dimension: usize,
    pub entries: Vec<PersistedEntry>,
}

/// Contents of `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub index_id: Uuid,
    pub format_version: u32,
    pub model_id: String,
    pub dimension: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    /// blake3 of `index.bin`, hex encoded
    pub checksum: String,
}

/// Persist `index` into `dir`, replacing whatever was there
pub(crate) fn write_index(dir: &Path, index: &PersistedIndex) -> VectorResult<IndexManifest> {
    std::fs::create_dir_all(dir).map_err(|e| {
        VectorError::persistence(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let bytes = bincode::serialize(index)
        .map_err(|e| VectorError::persistence(format!("Failed to encode index: {}", e)))?;

    let manifest = IndexManifest {
        index_id: Uuid::now_v7(),
        format_version: index.format_version,
        model_id: index.model_id.clone(),
        dimension: index.dimension,
        chunk_count: index.entries.len(),
        created_at: Utc::now(),
        checksum: blake3::hash(&bytes).to_hex().to_string(),
    };

    let manifest_json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| VectorError::persistence(format!("Failed to encode manifest: {}", e)))?;

    atomic_write(&dir.join(INDEX_FILE), &bytes)?;
    atomic_write(&dir.join(MANIFEST_FILE), &manifest_json)?;

    Ok(manifest)
}

/// Read and verify a persisted index. Any defect is reported as not found;
/// a checksum mismatch is kept apart so callers can retry it.
pub(crate) fn read_index(dir: &Path) -> Result<(IndexManifest, PersistedIndex), ReadError> {
    if !dir.is_dir() {
        return Err(VectorError::not_found(dir, "directory does not exist").into());
    }

    let manifest_bytes = std::fs::read(dir.join(MANIFEST_FILE))
        .map_err(|e| VectorError::not_found(dir, format!("{}: {}", MANIFEST_FILE, e)))?;
    let manifest: IndexManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| VectorError::not_found(dir, format!("{}: {}", MANIFEST_FILE, e)))?;

    if manifest.format_version != FORMAT_VERSION {
        return Err(VectorError::not_found(
            dir,
            format!("unsupported format version {}", manifest.format_version),
        )
        .into());
    }

    let bytes = std::fs::read(dir.join(INDEX_FILE))
        .map_err(|e| VectorError::not_found(dir, format!("{}: {}", INDEX_FILE, e)))?;

    let checksum = blake3::hash(&bytes).to_hex().to_string();
    if checksum != manifest.checksum {
        return Err(ReadError::Mismatch);
    }

    let index: PersistedIndex = bincode::deserialize(&bytes)
        .map_err(|e| VectorError::not_found(dir, format!("{}: {}", INDEX_FILE, e)))?;

    if index.entries.len() != manifest.chunk_count
        || index.model_id != manifest.model_id
        || index.dimension != manifest.dimension
    {
        return Err(VectorError::not_found(dir, "index disagrees with manifest").into());
    }
    if index.entries.iter().any(|e| e.vector.len() != index.dimension) {
        return Err(VectorError::not_found(dir, "stored vector has wrong length").into());
    }

    Ok((manifest, index))
}

fn atomic_write(path: &Path, bytes: &[u8]) -> VectorResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = std::path::PathBuf::from(temp_name);

    std::fs::write(&temp_path, bytes).map_err(|e| {
        VectorError::persistence(format!("Failed to write {}: {}", temp_path.display(), e))
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| {
        VectorError::persistence(format!("Failed to move {} into place: {}", path.display(), e))
    })?;

    Ok(())
}
