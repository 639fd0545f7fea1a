//! Configuration module for Polis RAG
//!
//! Handles application configuration including:
//! - Model backend invocation
//! - Embedding endpoint and chunking policy
//! - Vector index location and load policy
//! - Languages and prompt templates
//!
//! Configuration is loaded once at startup from an optional file plus
//! `POLIS__SECTION__KEY` environment overrides, validated, and then treated as
//! immutable for the lifetime of the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::language::Language;
use crate::chunker::ChunkingConfig;
use crate::embeddings::EmbeddingConfig;
use crate::gateway::GatewayConfig;
use crate::logging::LoggingConfig;
use crate::prompt::PromptTemplates;
use crate::vector::VectorIndexConfig;

/// Prefix for environment overrides, e.g. `POLIS__MODEL__TIMEOUT_SECS=60`
pub const ENV_PREFIX: &str = "POLIS";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inference backend invocation
    pub model: GatewayConfig,

    /// Embedding model used for chunks and queries
    pub embedding: EmbeddingConfig,

    /// Chunk size and overlap
    pub chunking: ChunkingConfig,

    /// Vector index location, retrieval depth and load policy
    pub index: VectorIndexConfig,

    /// Language preferences
    pub language: LanguageConfig,

    /// Accepted document types
    pub documents: DocumentConfig,

    /// Per-language, per-task prompt templates
    pub prompts: PromptTemplates,

    /// Logging setup
    pub logging: LoggingConfig,
}

/// Language preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language used when the caller does not pick one
    pub default: Language,

    /// Languages callers may request
    pub supported: Vec<Language>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: Language::De,
            supported: Language::ALL.to_vec(),
        }
    }
}

impl LanguageConfig {
    /// Resolve an optional caller choice against the enabled languages
    pub fn resolve(&self, requested: Option<Language>) -> ConfigResult<Language> {
        let language = requested.unwrap_or(self.default);
        if self.supported.contains(&language) {
            Ok(language)
        } else {
            Err(ConfigError::UnsupportedLanguage { language })
        }
    }
}

/// Accepted document types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// File extensions accepted for ingestion
    pub supported_file_types: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            supported_file_types: vec!["pdf".to_string(), "txt".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    ///
    /// The file format is picked from its extension (json, toml, yaml).
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(
            model = %loaded.model.model,
            embedding_model = %loaded.embedding.model,
            index_path = %loaded.index.path.display(),
            "Configuration loaded"
        );

        Ok(loaded)
    }

    /// Write this configuration as pretty JSON.
    ///
    /// Uses a temp file + rename so a crash never leaves a truncated file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                    reason: format!("Failed to create {}: {}", parent.display(), e),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            reason: e.to_string(),
        })?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(|e| ConfigError::SaveFailed {
            reason: format!("Failed to write {}: {}", temp_path.display(), e),
        })?;
        std::fs::rename(&temp_path, path).map_err(|e| ConfigError::SaveFailed {
            reason: format!("Failed to move config into place: {}", e),
        })?;

        Ok(())
    }

    /// Check cross-field invariants that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        self.chunking.validate()?;
        self.index.validate()?;
        self.model.validate()?;
        self.embedding.validate()?;

        self.language.resolve(None)?;
        for language in &self.language.supported {
            if self.prompts.for_language(*language).is_none() {
                return Err(ConfigError::MissingTemplates {
                    language: *language,
                });
            }
        }

        if self.documents.supported_file_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "documents.supported_file_types".to_string(),
                value: "[]".to_string(),
            });
        }

        Ok(())
    }
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("polis-rag")
        .join("config.json")
}
