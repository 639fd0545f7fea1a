//! Response language selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Language the model is asked to answer in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German
    #[default]
    De,
    /// English
    En,
}

impl Language {
    /// All languages the crate ships templates for
    pub const ALL: [Language; 2] = [Language::De, Language::En];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    /// Instruction appended to every prompt to steer the answer language.
    ///
    /// Advisory only; the backend output is not validated against it.
    pub fn response_directive(&self) -> &'static str {
        match self {
            Language::De => "Bitte antworte auf Deutsch.",
            Language::En => "Please respond in English.",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            other => Err(ConfigError::UnknownLanguage {
                code: other.to_string(),
            }),
        }
    }
}
