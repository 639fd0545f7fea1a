//! Model Gateway Module
//!
//! Talks to the local inference backend:
//! - Installed-model check with a short, fixed budget
//! - Prompt invocation with a hard timeout (the process is killed on expiry)
//! - Typed failures: timeout, backend error with stderr, invocation error,
//!   model not installed

mod config;
mod error;
mod process;
mod types;

#[cfg(test)]
mod tests;

pub use config::GatewayConfig;
pub use error::{ModelError, ModelErrorKind, ModelResult};
pub use process::ModelGateway;
pub use types::ModelInvocation;

use async_trait::async_trait;

use crate::core::Language;

/// The model capability the orchestrator depends on
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// `Ok` when the model can be used, otherwise `ModelError::NotAvailable`
    /// carrying the install command
    async fn ensure_available(&self) -> ModelResult<()>;

    /// Answer `prompt` in `language`, optionally under a system prompt.
    /// Returns the trimmed response.
    async fn ask(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        language: Language,
    ) -> ModelResult<String>;
}
