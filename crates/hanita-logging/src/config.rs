//! Logging configuration

use std::path::PathBuf;

/// File name prefix for rolled log files
pub const DEFAULT_FILE_PREFIX: &str = "ms-hist";

/// How events are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, colored when stdout is a terminal
    Pretty,
}

/// What the subscriber emits and where
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub default_level: String,
    /// Console output format
    pub console: ConsoleFormat,
    /// Rolling JSONL files, written in addition to the console
    pub file: Option<FileConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            console: ConsoleFormat::Json,
            file: None,
        }
    }
}

impl LogConfig {
    /// Set the default filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    /// Set the console format
    pub fn with_console(mut self, console: ConsoleFormat) -> Self {
        self.console = console;
        self
    }

    /// Also write JSONL to rolling files
    pub fn with_file_output(mut self, file: FileConfig) -> Self {
        self.file = Some(file);
        self
    }
}

/// Rolling file output
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// Directory holding the log files, created if missing
    pub directory: PathBuf,
    /// File name prefix
    pub prefix: String,
    /// When to start a new file
    pub rotation: RotationStrategy,
    /// Oldest files beyond this count are deleted
    pub max_files: Option<usize>,
}

impl FileConfig {
    /// Daily-rotated `ms-hist.*.log` files in `directory`, keeping a week
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
            rotation: RotationStrategy::Daily,
            max_files: Some(7),
        }
    }

    /// Set the rotation strategy
    pub fn with_rotation(mut self, rotation: RotationStrategy) -> Self {
        self.rotation = rotation;
        self
    }
}

/// File rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// Single file, never rolled
    Never,
}
