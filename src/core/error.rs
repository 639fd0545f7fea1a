//! Error types for Polis RAG
//!
//! Each subsystem owns its error enum. `PolisError` is what a whole command
//! run can fail with: configuration, logging setup, reading inputs, or the
//! session itself.

use std::path::PathBuf;

use thiserror::Error;

use super::language::Language;
use crate::extract::ExtractionError;
use crate::logging::LoggingError;
use crate::rag::RagError;

/// Result type alias for Polis RAG operations
pub type Result<T> = std::result::Result<T, PolisError>;

/// Main error type for Polis RAG
#[derive(Error, Debug)]
pub enum PolisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Config parse failed: {reason}")]
    ParseFailed { reason: String },

    #[error("Config save failed: {reason}")]
    SaveFailed { reason: String },

    #[error("Invalid chunking: chunk_size = {chunk_size}, overlap = {overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("Invalid config value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Unknown language: {code}")]
    UnknownLanguage { code: String },

    #[error("Language not enabled: {language}")]
    UnsupportedLanguage { language: Language },

    #[error("No prompt templates for language: {language}")]
    MissingTemplates { language: Language },

    #[error("Prompt template failed to render: {reason}")]
    Template { reason: String },
}

/// Configuration result type
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for ConfigError {
    fn from(err: minijinja::Error) -> Self {
        ConfigError::Template {
            reason: err.to_string(),
        }
    }
}
