//! redb table definitions and row encoding
//!
//! Defines the tables that make up the history log.

use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use hanita_core::{Action, EventId, EventRecord};

use crate::error::StorageError;

// Key: assigned event id, Value: postcard-encoded HistoryRow
pub const HISTORY: TableDefinition<u64, &[u8]> = TableDefinition::new("history");

// Key: table name, Value: last id handed out for that table
pub const HISTORY_SEQUENCE: TableDefinition<&str, u64> = TableDefinition::new("history_sequence");

/// Sequence key for the `history` table
pub const HISTORY_KEY: &str = "history";

/// On-disk form of one history row
///
/// The id lives in the table key, not in the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub user_id: i64,
    pub action: Action,
    pub time: f64,
}

impl HistoryRow {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        postcard::to_allocvec(self).map_err(StorageError::serialization)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        postcard::from_bytes(bytes).map_err(StorageError::deserialization)
    }

    pub fn into_record(self, id: u64) -> EventRecord {
        EventRecord {
            id: EventId::new(id),
            user_id: self.user_id,
            action: self.action,
            timestamp: self.time,
        }
    }
}
