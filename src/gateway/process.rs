//! Backend invocation through a child process

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::GatewayConfig;
use super::error::{ModelError, ModelResult};
use super::types::ModelInvocation;
use super::LanguageModel;
use crate::core::Language;

/// Environment forced onto every backend process
const UTF8_ENV: [(&str, &str); 3] = [
    ("PYTHONIOENCODING", "utf-8"),
    ("LC_ALL", "C.UTF-8"),
    ("LANG", "C.UTF-8"),
];

/// Runs the configured command-line backend
#[derive(Debug, Clone)]
pub struct ModelGateway {
    config: GatewayConfig,
}

impl ModelGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Command line that installs the configured model, e.g. `ollama pull deepseek-r1:8b`
    pub fn install_command(&self) -> String {
        let mut parts = vec![self.config.program.clone()];
        parts.extend(
            self.config
                .install_args
                .iter()
                .map(|arg| render_arg(arg, |name| self.model_placeholder(name))),
        );
        parts.join(" ")
    }

    /// Whether the backend lists the configured model.
    ///
    /// Bounded by `availability_timeout_ms`. Every failure reads as `false`.
    pub async fn check_availability(&self) -> bool {
        let args: Vec<String> = self
            .config
            .list_args
            .iter()
            .map(|arg| render_arg(arg, |name| self.model_placeholder(name)))
            .collect();

        let budget = self.config.availability_timeout();
        let output = match self.run(&args, budget).await {
            Ok(output) => output,
            Err(e) => {
                warn!(model = %self.config.model, error = %e, "Model backend not reachable");
                return false;
            }
        };

        if !output.status.success() {
            warn!(
                model = %self.config.model,
                exit_code = ?output.status.code(),
                "Model listing failed"
            );
            return false;
        }

        match String::from_utf8(output.stdout) {
            Ok(listing) => {
                let available = listing.contains(&self.config.model);
                if !available {
                    warn!(model = %self.config.model, "Model not installed");
                }
                available
            }
            Err(_) => {
                warn!(model = %self.config.model, "Model listing is not valid UTF-8");
                false
            }
        }
    }

    /// Run one prompt and return the raw stdout.
    ///
    /// The composed text (system prompt, prompt and language directive) is
    /// passed as the `{prompt}` argument.
    pub async fn invoke(&self, invocation: &ModelInvocation) -> ModelResult<String> {
        let prompt = invocation.compose();
        let args: Vec<String> = self
            .config
            .run_args
            .iter()
            .map(|arg| {
                render_arg(arg, |name| match name {
                    "prompt" => Some(prompt.clone()),
                    "temperature" => Some(invocation.temperature.to_string()),
                    "max_tokens" => Some(invocation.max_tokens.to_string()),
                    other => self.model_placeholder(other),
                })
            })
            .collect();

        if !self.mentions("temperature") || !self.mentions("max_tokens") {
            debug!(
                temperature = invocation.temperature,
                max_tokens = invocation.max_tokens,
                "Sampling options not applied; run_args have no placeholder for them"
            );
        }

        let start = Instant::now();
        let output = match self.run(&args, invocation.timeout).await {
            Ok(output) => output,
            Err(RunError::TimedOut) => {
                let elapsed = start.elapsed();
                warn!(
                    model = %self.config.model,
                    duration_ms = elapsed.as_millis() as u64,
                    "Model invocation timed out"
                );
                return Err(ModelError::Timeout {
                    elapsed,
                    limit: invocation.timeout,
                });
            }
            Err(RunError::Io(reason)) => return Err(ModelError::invocation(reason)),
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                model = %self.config.model,
                exit_code = ?output.status.code(),
                duration_ms,
                "Model backend failed"
            );
            return Err(ModelError::Backend {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ModelError::invocation(format!("backend output is not UTF-8: {}", e)))?;

        info!(
            model = %self.config.model,
            language = %invocation.language,
            duration_ms,
            response_chars = stdout.chars().count(),
            "Model invocation completed"
        );

        Ok(stdout)
    }

    /// Availability as a typed result, for callers that report it
    pub async fn ensure_available(&self) -> ModelResult<()> {
        if self.check_availability().await {
            Ok(())
        } else {
            Err(ModelError::NotAvailable {
                model: self.config.model.clone(),
                install_command: self.install_command(),
            })
        }
    }

    /// Check availability, compose, invoke and trim
    pub async fn ask(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        language: Language,
    ) -> ModelResult<String> {
        self.ensure_available().await?;

        let mut invocation = ModelInvocation::new(prompt, language, self.config.timeout())
            .with_sampling(self.config.temperature, self.config.max_tokens);
        if let Some(system) = system_prompt {
            invocation = invocation.with_system_prompt(system);
        }

        let response = self.invoke(&invocation).await?;
        Ok(response.trim().to_string())
    }

    fn model_placeholder(&self, name: &str) -> Option<String> {
        match name {
            "model" => Some(self.config.model.clone()),
            _ => None,
        }
    }

    fn mentions(&self, placeholder: &str) -> bool {
        let token = format!("{{{}}}", placeholder);
        self.config.run_args.iter().any(|arg| arg.contains(&token))
    }

    async fn run(
        &self,
        args: &[String],
        budget: std::time::Duration,
    ) -> Result<std::process::Output, RunError> {
        let mut command = Command::new(&self.config.program);
        command
            .args(args)
            .envs(UTF8_ENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            RunError::Io(format!("failed to start {}: {}", self.config.program, e))
        })?;

        match tokio::time::timeout(budget, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| RunError::Io(format!("failed to read output: {}", e))),
            Err(_) => Err(RunError::TimedOut),
        }
    }
}

#[async_trait]
impl LanguageModel for ModelGateway {
    async fn ensure_available(&self) -> ModelResult<()> {
        ModelGateway::ensure_available(self).await
    }

    async fn ask(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        language: Language,
    ) -> ModelResult<String> {
        ModelGateway::ask(self, prompt, system_prompt, language).await
    }
}

#[derive(Debug)]
enum RunError {
    TimedOut,
    Io(String),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::TimedOut => f.write_str("timed out"),
            RunError::Io(reason) => f.write_str(reason),
        }
    }
}

/// Replace `{name}` placeholders in one pass; unknown names stay verbatim
pub(crate) fn render_arg(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                // "{a{model}": only the innermost brace opens a placeholder
                if let Some(inner) = name.rfind('{') {
                    out.push('{');
                    out.push_str(&name[..inner]);
                    rest = &after[inner..];
                    continue;
                }
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
