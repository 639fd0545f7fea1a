//! Polis RAG Core Module
//!
//! This module contains the pieces every other module leans on:
//! - Configuration management
//! - Error types
//! - Response language selection

pub mod config;
pub mod error;
pub mod language;


// Re-export commonly used items
pub use config::{AppConfig, DocumentConfig, LanguageConfig};
pub use error::{ConfigError, ConfigResult, PolisError, Result};
pub use language::Language;
