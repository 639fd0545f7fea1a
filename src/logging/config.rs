//! Logging settings, read from the `logging` section of the app config

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Verbosity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        })
    }
}

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where log lines go. Stdout is never used; it carries answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    File,
    Both,
}

impl LogOutput {
    pub fn to_stderr(self) -> bool {
        matches!(self, LogOutput::Stderr | LogOutput::Both)
    }

    pub fn to_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Rollover cadence of the log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Only used when `output` includes the file
    pub directory: PathBuf,

    /// Prefix of the rolling file name
    pub file_name: String,

    pub rotation: RotationStrategy,

    /// Per-target overrides, e.g. `polis_rag::gateway = "debug"`
    pub targets: BTreeMap<String, LogLevel>,

    /// Prefix lines with their module path
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            directory: dirs::data_local_dir()
                .map(|dir| dir.join("polis-rag").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
            file_name: "polis.log".to_string(),
            rotation: RotationStrategy::Daily,
            targets: BTreeMap::new(),
            show_target: false,
        }
    }
}
