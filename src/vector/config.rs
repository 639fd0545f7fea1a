//! Vector index configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// Where the index lives and how it is queried
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Directory holding `index.bin` and `manifest.json`
    pub path: PathBuf,

    /// Chunks retrieved per question
    pub retrieval_k: usize,

    /// Load a persisted index without an explicit per-call opt-in.
    ///
    /// Only enable this for index directories this process wrote itself.
    pub allow_dangerous_deserialization: bool,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vector_index"),
            retrieval_k: 3,
            allow_dangerous_deserialization: false,
        }
    }
}

impl VectorIndexConfig {
    /// Create a configuration for a specific directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the retrieval depth
    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.retrieval_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "index.retrieval_k".to_string(),
                value: "0".to_string(),
            });
        }
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "index.path".to_string(),
                value: "\"\"".to_string(),
            });
        }
        Ok(())
    }
}
