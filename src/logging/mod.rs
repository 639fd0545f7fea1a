//! Logging for Polis RAG
//!
//! One `tracing` subscriber per process, configured from [`LoggingConfig`]:
//! an `EnvFilter` (overridable with `RUST_LOG`), then an optional stderr
//! layer and an optional non-blocking rolling file layer.

mod config;


pub use config::{LogFormat, LogLevel, LogOutput, LoggingConfig, RotationStrategy};

use std::path::PathBuf;

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("A global subscriber is already installed: {0}")]
    AlreadyInstalled(String),

    #[error("Cannot create log directory {path}: {reason}")]
    Directory { path: PathBuf, reason: String },

    #[error("Invalid log directive: {0}")]
    InvalidDirective(String),
}

pub type LoggingResult<T> = Result<T, LoggingError>;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Handle to the installed subscriber.
///
/// Hold it until exit: dropping it flushes the file writer.
pub struct LoggingSystem {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingSystem {
    pub fn init(config: &LoggingConfig) -> LoggingResult<Self> {
        let filter = build_env_filter(config)?;

        let (file, file_guard) = if config.output.to_file() {
            let (layer, guard) = file_layer(config)?;
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };
        let stderr = config.output.to_stderr().then(|| stderr_layer(config));

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .with(file)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;

        Ok(Self {
            _file_guard: file_guard,
        })
    }
}

/// `RUST_LOG` if set, else the configured level, plus per-target overrides
pub(crate) fn build_env_filter(config: &LoggingConfig) -> LoggingResult<EnvFilter> {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    for (target, level) in &config.targets {
        let directive = format!("{}={}", target, level);
        let parsed = directive
            .parse()
            .map_err(|_| LoggingError::InvalidDirective(directive.clone()))?;
        filter = filter.add_directive(parsed);
    }

    Ok(filter)
}

fn stderr_layer<S>(config: &LoggingConfig) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

fn file_layer<S>(config: &LoggingConfig) -> LoggingResult<(BoxedLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.directory).map_err(|e| LoggingError::Directory {
        path: config.directory.clone(),
        reason: e.to_string(),
    })?;

    let rotation = match config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.show_target)
        .with_ansi(false);

    let layer = match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    };
    Ok((layer, guard))
}
