//! Request types for the model gateway

use std::time::Duration;

use crate::core::Language;

/// One request to the backend. Built per call, never retained.
#[derive(Debug, Clone)]
pub struct ModelInvocation {
    /// Task prompt as written by the caller
    pub prompt: String,
    /// Optional role-setting system prompt
    pub system_prompt: Option<String>,
    /// Language the answer is requested in
    pub language: Language,
    /// Hard limit for the backend process
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelInvocation {
    pub fn new(prompt: impl Into<String>, language: Language, timeout: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            language,
            timeout,
            temperature: 0.7,
            max_tokens: 2_000,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Full text sent to the backend.
    ///
    /// `"{system}\n\nHuman: {prompt}\n\n{directive}"`, or
    /// `"{prompt}\n\n{directive}"` without a system prompt.
    pub fn compose(&self) -> String {
        let directive = self.language.response_directive();
        match self.system_prompt.as_deref() {
            Some(system) if !system.trim().is_empty() => {
                format!("{}\n\nHuman: {}\n\n{}", system, self.prompt, directive)
            }
            _ => format!("{}\n\n{}", self.prompt, directive),
        }
    }
}
