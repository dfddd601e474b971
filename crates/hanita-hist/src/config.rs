//! Configuration for the history service

use hanita_storage::HistoryStoreConfig;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port
pub const DEFAULT_PORT: u16 = 5555;

/// Default per-connection read buffer, and so the largest accepted message
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for a [`HistoryService`](crate::HistoryService)
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Host or IP to bind
    pub host: String,
    /// TCP port to bind; `0` picks an ephemeral port
    pub port: u16,
    /// History store configuration
    pub store: HistoryStoreConfig,
    /// Size of each connection's read buffer
    pub read_buffer_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: HistoryStoreConfig::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ServiceConfig {
    /// `host:port` as passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Set the bind host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the store configuration
    pub fn with_store(mut self, store: HistoryStoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set the per-connection read buffer size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }
}
