//! `ms-hist`: records Hanita user enter/quit events sent over TCP

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use hanita_hist::{
    shutdown_signal, HistoryService, ServiceConfig, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_READ_BUFFER_SIZE,
};
use hanita_logging::{ConsoleFormat, FileConfig, HanitaSubscriberBuilder, LogConfig};
use hanita_storage::{HistoryStoreConfig, DEFAULT_CACHE_SIZE, DEFAULT_DB_PATH};

#[derive(Parser)]
#[command(name = "ms-hist", version, about = "Hanita session history ingestion service")]
struct Cli {
    /// Host or IP to listen on
    #[arg(long, env = "HANITA_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// TCP port to listen on
    #[arg(short, long, env = "HANITA_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// History database file
    #[arg(long, env = "HANITA_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,

    /// Per-connection read buffer in bytes; also the largest accepted message
    #[arg(long, env = "HANITA_READ_BUFFER_SIZE", default_value_t = DEFAULT_READ_BUFFER_SIZE)]
    read_buffer_size: usize,

    /// Database page cache in bytes
    #[arg(long, env = "HANITA_CACHE_SIZE", default_value_t = DEFAULT_CACHE_SIZE)]
    cache_size: usize,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Console log format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Also write JSONL logs to daily-rotated files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable
    Pretty,
}

impl From<LogFormat> for ConsoleFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => ConsoleFormat::Json,
            LogFormat::Pretty => ConsoleFormat::Pretty,
        }
    }
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let config = LogConfig::default()
            .with_level(if self.verbose { "debug" } else { "info" })
            .with_console(self.log_format.into());

        match &self.log_dir {
            Some(dir) => config.with_file_output(FileConfig::new(dir)),
            None => config,
        }
    }

    fn service_config(&self) -> ServiceConfig {
        let store = HistoryStoreConfig::default()
            .with_db_path(&self.db_path)
            .with_cache_size(self.cache_size);

        ServiceConfig::default()
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_store(store)
            .with_read_buffer_size(self.read_buffer_size)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = HanitaSubscriberBuilder::new()
        .with_config(cli.log_config())
        .try_init()
        .context("failed to initialize logging")?;

    let config = cli.service_config();
    let service = HistoryService::start(config.clone())
        .await
        .with_context(|| format!("failed to start history service on {}", config.bind_addr()))?;

    info!(
        addr = %service.local_addr(),
        db_path = %config.store.db_path.display(),
        "ms-hist ready"
    );

    service
        .run_until(async {
            match shutdown_signal().await {
                Ok(signal) => info!(%signal, "Received shutdown signal"),
                Err(e) => error!(error = %e, "Failed to listen for shutdown signal, stopping"),
            }
        })
        .await
        .context("failed to stop history service")?;

    Ok(())
}
