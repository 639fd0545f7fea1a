//! Prompt composition
//!
//! Renders role-specific system prompts and the two task prompts (profile
//! recommendation, context-grounded question) from per-language templates.
//! User text is inserted in a single rendering pass and never re-expanded.

mod templates;


pub use templates::{LanguageTemplates, PromptTemplates};

use std::fmt;
use std::str::FromStr;

use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::Language;

/// Which base instructions a system prompt starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Matching positions to parties
    PartyAnalysis,
    /// Analysing political documents
    DocAnalysis,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::PartyAnalysis => f.write_str("party"),
            TaskKind::DocAnalysis => f.write_str("doc"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "party" | "party_analysis" => Ok(TaskKind::PartyAnalysis),
            "doc" | "doc_analysis" => Ok(TaskKind::DocAnalysis),
            other => Err(ConfigError::InvalidValue {
                field: "task".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Renders prompts from a fixed template set
pub struct PromptBuilder {
    templates: PromptTemplates,
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new(templates: PromptTemplates) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self { templates, env }
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// System prompt for `task`, embedding `role_description` verbatim
    pub fn system_prompt(
        &self,
        task: TaskKind,
        role_description: &str,
        language: Language,
    ) -> ConfigResult<String> {
        let templates = self.templates_for(language)?;
        let base_prompt = match task {
            TaskKind::PartyAnalysis => &templates.party_analysis,
            TaskKind::DocAnalysis => &templates.doc_analysis,
        };

        self.render(
            &templates.system_prompt,
            context! { base_prompt => base_prompt, role_description => role_description },
        )
    }

    /// Five-part party recommendation request for `profile`
    pub fn party_recommendation_prompt(
        &self,
        profile: &str,
        language: Language,
    ) -> ConfigResult<String> {
        let templates = self.templates_for(language)?;
        self.render(&templates.party_recommendation, context! { profile => profile })
    }

    /// Cross-party, fact-based analysis of `question` grounded in `context`
    pub fn doc_question_prompt(
        &self,
        context_text: &str,
        question: &str,
        language: Language,
    ) -> ConfigResult<String> {
        let templates = self.templates_for(language)?;
        self.render(
            &templates.doc_question,
            context! { context => context_text, question => question },
        )
    }

    fn templates_for(&self, language: Language) -> ConfigResult<&LanguageTemplates> {
        self.templates
            .for_language(language)
            .ok_or(ConfigError::MissingTemplates { language })
    }

    fn render(&self, template: &str, ctx: minijinja::Value) -> ConfigResult<String> {
        Ok(self.env.render_str(template, ctx)?)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptTemplates::default())
    }
}
