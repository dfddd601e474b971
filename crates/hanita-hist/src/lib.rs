//! # Hanita History Service
//!
//! TCP ingestion service that records user session events (`enter` /
//! `quit`) into the append-only [`HistoryStore`](hanita_storage::HistoryStore).
//!
//! Clients connect and send one JSON object per write:
//!
//! ```text
//! {"user_id": 355, "action": "enter", "timestamp": 34523.23322}
//! ```
//!
//! The service never answers. Malformed messages are logged and dropped,
//! valid ones are appended in the background while the connection keeps
//! reading.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hanita_hist::{shutdown_signal, HistoryService, ServiceConfig};
//!
//! let service = HistoryService::start(ServiceConfig::default()).await?;
//! println!("listening on {}", service.local_addr());
//!
//! service
//!     .run_until(async {
//!         let _ = shutdown_signal().await;
//!     })
//!     .await?;
//! ```

mod config;
mod error;
pub mod connection;
pub mod listener;
mod service;
pub mod shutdown;

pub use config::{ServiceConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_READ_BUFFER_SIZE};
pub use connection::ConnectionHandler;
pub use error::{ServiceError, ServiceResult};
pub use listener::Listener;
pub use service::HistoryService;
pub use shutdown::{shutdown_signal, ShutdownSignal};
