//! Document text extraction
//!
//! Turns uploaded bytes into plain text:
//! - `application/pdf` through pdf-extract, pages in order
//! - `text/plain` as strict UTF-8


use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during text extraction
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document type: {kind}")]
    UnsupportedType { kind: String },

    #[error("Document not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Failed to extract text from {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

/// Result type for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Text => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "txt",
        }
    }

    /// Parse a MIME type; parameters such as `; charset=utf-8` are ignored
    pub fn from_mime(mime: &str) -> ExtractionResult<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "text/plain" => Ok(DocumentKind::Text),
            _ => Err(ExtractionError::UnsupportedType {
                kind: mime.to_string(),
            }),
        }
    }

    pub fn from_extension(extension: &str) -> ExtractionResult<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Text),
            other => Err(ExtractionError::UnsupportedType {
                kind: format!(".{}", other),
            }),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Raw document bytes with their type tag
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// Build from a MIME type tag, rejecting anything but PDF and plain text
    pub fn from_mime(name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> ExtractionResult<Self> {
        Ok(Self::new(name, DocumentKind::from_mime(mime)?, bytes))
    }

    /// Read a file whose extension is one of `supported_extensions`
    pub async fn from_path(path: &Path, supported_extensions: &[String]) -> ExtractionResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !supported_extensions
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&extension))
        {
            return Err(ExtractionError::UnsupportedType {
                kind: format!(".{}", extension),
            });
        }
        let kind = DocumentKind::from_extension(&extension)?;

        if !path.exists() {
            return Err(ExtractionError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractionError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, kind, bytes))
    }
}

/// Extracts plain text from a document
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &SourceDocument) -> ExtractionResult<String>;
}

/// PDF and plain-text extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, document: &SourceDocument) -> ExtractionResult<String> {
        let text = match document.kind {
            DocumentKind::Text => String::from_utf8(document.bytes.clone()).map_err(|e| {
                ExtractionError::Unreadable {
                    name: document.name.clone(),
                    reason: format!("not valid UTF-8: {}", e),
                }
            })?,
            DocumentKind::Pdf => {
                // pdf-extract is CPU bound and may panic on malformed input
                let bytes = document.bytes.clone();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| ExtractionError::Unreadable {
                        name: document.name.clone(),
                        reason: format!("PDF extraction aborted: {}", e),
                    })?
                    .map_err(|e| ExtractionError::Unreadable {
                        name: document.name.clone(),
                        reason: format!("PDF extraction failed: {}", e),
                    })?
            }
        };

        tracing::debug!(
            document = %document.name,
            kind = %document.kind,
            chars = text.chars().count(),
            "Extracted document text"
        );

        Ok(text)
    }
}
