//! JSONL and console logging for the Hanita history service
//!
//! Console output is one JSON object per line by default, or human-readable
//! with [`ConsoleFormat::Pretty`]. Optional rolling files always get JSONL.
//! `RUST_LOG` overrides the configured level.
//!
//! ```ignore
//! use hanita_logging::{ConsoleFormat, FileConfig, HanitaSubscriberBuilder, LogConfig};
//!
//! let config = LogConfig::default()
//!     .with_console(ConsoleFormat::Pretty)
//!     .with_file_output(FileConfig::new("./logs"));
//! let _guard = HanitaSubscriberBuilder::new().with_config(config).try_init()?;
//! ```
//!
//! Keep the returned guard alive for as long as file output should be
//! flushed; dropping it stops the background writer.

pub mod config;

pub use config::{ConsoleFormat, FileConfig, LogConfig, RotationStrategy, DEFAULT_FILE_PREFIX};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::io::IsTerminal;

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured default level is not a valid filter directive
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// The log directory could not be created
    #[error("Log directory error: {0}")]
    Io(#[from] std::io::Error),

    /// The rolling file appender could not be created
    #[error("Log file error: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber is already installed
    #[error("Subscriber already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Builds and installs the global subscriber
pub struct HanitaSubscriberBuilder {
    config: LogConfig,
}

impl HanitaSubscriberBuilder {
    /// Start from [`LogConfig::default`]
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the subscriber globally
    ///
    /// Returns the file writer guard when file output is configured. Fails
    /// if a global subscriber is already set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let (subscriber, guard) = self.build()?;
        subscriber.try_init()?;
        Ok(guard)
    }

    /// Assemble the subscriber without installing it
    fn build(
        self,
    ) -> Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>), LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.config.default_level))?;

        let (pretty_console, json_console) = match self.config.console {
            ConsoleFormat::Pretty => {
                let ansi = std::io::stdout().is_terminal();
                (Some(fmt::layer().with_ansi(ansi).with_target(true)), None)
            }
            ConsoleFormat::Json => (None, Some(jsonl_layer(std::io::stdout))),
        };

        let (file_layer, guard) = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = tracing_appender::non_blocking(file_appender(file_config)?);
                (Some(jsonl_layer(writer)), Some(guard))
            }
            None => (None, None),
        };

        let subscriber = Registry::default()
            .with(env_filter)
            .with(pretty_console)
            .with(json_console)
            .with(file_layer);

        Ok((subscriber, guard))
    }
}

impl Default for HanitaSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattened JSONL with the enclosing spans (e.g. `connection{peer}`)
fn jsonl_layer<S, W>(writer: W) -> fmt::Layer<S, JsonFields, Format<Json>, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(writer)
}

fn file_appender(config: &FileConfig) -> Result<RollingFileAppender, LoggingError> {
    std::fs::create_dir_all(&config.directory)?;

    let rotation = match config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.prefix.as_str())
        .filename_suffix("log");
    if let Some(max_files) = config.max_files {
        builder = builder.max_log_files(max_files);
    }

    Ok(builder.build(&config.directory)?)
}
