//! Error types for the model gateway

use std::time::Duration;

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Coarse classification of a [`ModelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    Timeout,
    BackendError,
    InvocationError,
    NotAvailable,
}

/// Model invocation errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend did not finish within the budget and was killed
    #[error("Model timed out after {}s", elapsed.as_secs())]
    Timeout { elapsed: Duration, limit: Duration },

    /// The backend ran and exited unsuccessfully
    #[error("Model backend failed: {stderr}")]
    Backend { exit_code: Option<i32>, stderr: String },

    /// The backend could not be run or its output could not be read
    #[error("Model invocation failed: {reason}")]
    Invocation { reason: String },

    /// The configured model is not installed in the backend
    #[error("Model {model} is not installed; run '{install_command}'")]
    NotAvailable {
        model: String,
        install_command: String,
    },
}

impl ModelError {
    pub fn kind(&self) -> ModelErrorKind {
        match self {
            ModelError::Timeout { .. } => ModelErrorKind::Timeout,
            ModelError::Backend { .. } => ModelErrorKind::BackendError,
            ModelError::Invocation { .. } => ModelErrorKind::InvocationError,
            ModelError::NotAvailable { .. } => ModelErrorKind::NotAvailable,
        }
    }

    /// Raw detail carried by the error: stderr, elapsed seconds, reason, or
    /// install command.
    pub fn detail(&self) -> String {
        match self {
            ModelError::Timeout { elapsed, .. } => format!("{:.1}s", elapsed.as_secs_f64()),
            ModelError::Backend { stderr, .. } => stderr.clone(),
            ModelError::Invocation { reason } => reason.clone(),
            ModelError::NotAvailable {
                install_command, ..
            } => install_command.clone(),
        }
    }

    pub(crate) fn invocation(reason: impl Into<String>) -> Self {
        ModelError::Invocation {
            reason: reason.into(),
        }
    }
}
