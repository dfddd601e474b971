//! Service lifecycle: store + listener, started and stopped together

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use hanita_storage::HistoryStore;

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::listener::Listener;

/// A running history ingestion service
///
/// Owns the [`HistoryStore`] and the accept loop. The store is shared with
/// every connection task through an `Arc`; there is no global instance.
pub struct HistoryService {
    /// Service configuration
    config: ServiceConfig,
    /// Shared history store
    store: Arc<HistoryStore>,
    /// Address the listener is bound to
    local_addr: SocketAddr,
    /// Shutdown signal for the accept loop and connection handlers
    shutdown_tx: watch::Sender<bool>,
    /// Accept loop task (None once stopped)
    accept_task: Mutex<Option<JoinHandle<()>>>,
    /// Whether the service is accepting connections
    running: AtomicBool,
}

impl HistoryService {
    /// Open the store, bind the listener and start accepting connections
    ///
    /// Fails with a storage error if the store cannot be opened and with
    /// `BindFailure` if the address is unavailable; in the latter case the
    /// store is closed again before returning.
    #[instrument(skip(config), fields(addr = %config.bind_addr()))]
    pub async fn start(config: ServiceConfig) -> ServiceResult<Self> {
        let store = Arc::new(HistoryStore::open(config.store.clone())?);

        let listener = match Listener::bind(&config.bind_addr()).await {
            Ok(listener) => listener,
            Err(e) => {
                store.close();
                return Err(e);
            }
        };
        let local_addr = listener.local_addr();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(listener.run(
            Arc::clone(&store),
            config.read_buffer_size,
            shutdown_rx,
        ));

        info!(addr = %local_addr, "History service started");

        Ok(Self {
            config,
            store,
            local_addr,
            shutdown_tx,
            accept_task: Mutex::new(Some(accept_task)),
            running: AtomicBool::new(true),
        })
    }

    /// Stop accepting connections, then close the store
    ///
    /// The accept loop is torn down before the store is closed. Appends that
    /// are still in flight may fail with `StoreClosed` and are logged.
    /// Calling this more than once is a no-op.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> ServiceResult<()> {
        let Some(accept_task) = self.accept_task.lock().await.take() else {
            return Ok(()); // Already stopped
        };
        self.running.store(false, Ordering::SeqCst);

        // Receivers may already be gone if the accept loop died
        let _ = self.shutdown_tx.send(true);
        let joined = accept_task.await;

        // close() blocks until an in-flight commit finishes
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.close()).await?;
        joined?;

        info!("History service stopped");
        Ok(())
    }

    /// Wait for `signal` to resolve, then [`stop`](Self::stop)
    pub async fn run_until<F>(&self, signal: F) -> ServiceResult<()>
    where
        F: Future<Output = ()>,
    {
        signal.await;
        self.stop().await
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The shared history store
    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether the service is still accepting connections
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
