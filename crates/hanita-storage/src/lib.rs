//! # Hanita Storage
//!
//! Durable, append-only history of session events.
//!
//! The store is a single redb database file holding a `history` table keyed
//! by auto-incrementing id, plus a `history_sequence` table that remembers the
//! last id handed out so ids are never reused, even across restarts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hanita_storage::{HistoryStore, HistoryStoreConfig};
//!
//! let store = HistoryStore::open(HistoryStoreConfig::default().with_db_path("./hist.redb"))?;
//!
//! let id = store.append(355, "enter", 34523.23322)?;
//! assert_eq!(id.get(), 1);
//!
//! // Out-of-range actions are rejected at the storage boundary
//! assert!(store.append(1, "leave", 1.0).is_err());
//!
//! store.close();
//! ```

pub mod error;
pub mod history;
mod tables;

// Re-exports
pub use error::StorageError;
pub use history::{HistoryStore, HistoryStoreConfig, DEFAULT_CACHE_SIZE, DEFAULT_DB_PATH};
