//! Configuration for the model gateway

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// How the local inference backend is invoked.
///
/// Argument lists are templates: `{model}`, `{prompt}`, `{temperature}` and
/// `{max_tokens}` are replaced per argument. No shell is involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend executable
    pub program: String,

    /// Model identifier passed to the backend
    pub model: String,

    /// Budget for one model invocation
    pub timeout_secs: u64,

    /// Budget for the installed-models query
    pub availability_timeout_ms: u64,

    /// Sampling temperature, applied only where `run_args` mention it
    pub temperature: f32,

    /// Generation limit, applied only where `run_args` mention it
    pub max_tokens: u32,

    /// Arguments listing installed models
    pub list_args: Vec<String>,

    /// Arguments running one prompt
    pub run_args: Vec<String>,

    /// Arguments installing the model, shown to the user when it is missing
    pub install_args: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            model: "deepseek-r1:8b".to_string(),
            timeout_secs: 120,
            availability_timeout_ms: 5_000,
            temperature: 0.7,
            max_tokens: 2_000,
            list_args: vec!["list".to_string()],
            run_args: vec![
                "run".to_string(),
                "{model}".to_string(),
                "{prompt}".to_string(),
            ],
            install_args: vec!["pull".to_string(), "{model}".to_string()],
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn availability_timeout(&self) -> Duration {
        Duration::from_millis(self.availability_timeout_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, value: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        };

        if self.program.trim().is_empty() {
            return Err(invalid("model.program", "\"\"".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(invalid("model.model", "\"\"".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("model.timeout_secs", "0".to_string()));
        }
        if self.availability_timeout_ms == 0 {
            return Err(invalid("model.availability_timeout_ms", "0".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("model.temperature", self.temperature.to_string()));
        }
        if !self.run_args.iter().any(|arg| arg.contains("{prompt}")) {
            return Err(invalid("model.run_args", format!("{:?}", self.run_args)));
        }
        Ok(())
    }
}
