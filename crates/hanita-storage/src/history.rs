//! Append-only session history backed by redb
//!
//! Every append runs in its own write transaction and is durable once
//! [`HistoryStore::append`] returns. redb admits one write transaction at a
//! time, so concurrent callers are serialized here rather than by the caller.

use std::path::PathBuf;

use parking_lot::RwLock;
use redb::{Builder, Database, ReadableTable, ReadableTableMetadata};
use tracing::{debug, info, instrument};

use hanita_core::{Action, EventId, EventRecord};

use crate::error::StorageError;
use crate::tables::{HistoryRow, HISTORY, HISTORY_KEY, HISTORY_SEQUENCE};

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "hist.redb";

/// Default redb page cache, in bytes
pub const DEFAULT_CACHE_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for the history store
#[derive(Debug, Clone)]
pub struct HistoryStoreConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// Page cache size in bytes
    pub cache_size: usize,
}

impl Default for HistoryStoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl HistoryStoreConfig {
    /// Set the database file path
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// Set the page cache size
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }
}

/// Durable, append-only log of session events
///
/// The store owns its database file exclusively until [`close`](Self::close)
/// is called. Share it between tasks as `Arc<HistoryStore>`.
pub struct HistoryStore {
    /// `None` once closed
    db: RwLock<Option<Database>>,
    config: HistoryStoreConfig,
}

impl HistoryStore {
    /// Open or create the store and make sure its tables exist
    #[instrument(skip(config), fields(path = %config.db_path.display()))]
    pub fn open(config: HistoryStoreConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new()
            .set_cache_size(config.cache_size)
            .create(&config.db_path)
            .map_err(StorageError::unavailable)?;

        info!("Opened history store");

        let store = Self {
            db: RwLock::new(Some(db)),
            config,
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Create the history tables if they are absent
    ///
    /// Safe to call any number of times; existing rows are untouched.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::StoreClosed)?;

        let write_txn = db.begin_write().map_err(StorageError::unavailable)?;
        write_txn
            .open_table(HISTORY)
            .map_err(StorageError::unavailable)?;
        write_txn
            .open_table(HISTORY_SEQUENCE)
            .map_err(StorageError::unavailable)?;
        write_txn.commit().map_err(StorageError::unavailable)?;

        debug!("History schema ready");
        Ok(())
    }

    /// Append one event and return its assigned id
    ///
    /// The action is checked against the enumeration before anything is
    /// written, so a rejected append never consumes an id.
    #[instrument(skip(self), level = "debug")]
    pub fn append(
        &self,
        user_id: i64,
        action: &str,
        timestamp: f64,
    ) -> Result<EventId, StorageError> {
        let action: Action = action
            .parse()
            .map_err(|_| StorageError::InvalidAction(action.to_string()))?;

        let row = HistoryRow {
            user_id,
            action,
            time: timestamp,
        }
        .to_bytes()?;

        // Held for the whole transaction so close() waits for us
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::StoreClosed)?;

        let write_txn = db.begin_write().map_err(StorageError::unavailable)?;
        let id = {
            let mut sequence = write_txn
                .open_table(HISTORY_SEQUENCE)
                .map_err(StorageError::unavailable)?;
            let mut history = write_txn
                .open_table(HISTORY)
                .map_err(StorageError::unavailable)?;

            let last = sequence
                .get(HISTORY_KEY)
                .map_err(StorageError::unavailable)?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = last + 1;

            history
                .insert(id, row.as_slice())
                .map_err(StorageError::unavailable)?;
            sequence
                .insert(HISTORY_KEY, id)
                .map_err(StorageError::unavailable)?;
            id
        };
        // Default durability is Immediate: the commit is fsynced
        write_txn.commit().map_err(StorageError::unavailable)?;

        debug!(id, "Appended history row");
        Ok(EventId::new(id))
    }

    /// Read every event recorded for a user
    ///
    /// Not supported: always fails with [`StorageError::NotImplemented`].
    pub fn get_by_user(&self, _user_id: i64) -> Result<Vec<EventRecord>, StorageError> {
        Err(StorageError::NotImplemented("get_by_user"))
    }

    /// Read a single row by id
    pub fn get(&self, id: EventId) -> Result<Option<EventRecord>, StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::StoreClosed)?;

        let read_txn = db.begin_read().map_err(StorageError::unavailable)?;
        let table = read_txn
            .open_table(HISTORY)
            .map_err(StorageError::unavailable)?;

        let Some(bytes) = table.get(id.get()).map_err(StorageError::unavailable)? else {
            return Ok(None);
        };
        let row = HistoryRow::from_bytes(bytes.value())?;

        Ok(Some(row.into_record(id.get())))
    }

    /// Raw number of rows in the history table
    pub fn len(&self) -> Result<u64, StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::StoreClosed)?;

        let read_txn = db.begin_read().map_err(StorageError::unavailable)?;
        let table = read_txn
            .open_table(HISTORY)
            .map_err(StorageError::unavailable)?;

        table.len().map_err(StorageError::unavailable)
    }

    /// Whether the history table is empty
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Release the database file
    ///
    /// Waits for any append already inside its transaction. Later appends
    /// fail with [`StorageError::StoreClosed`]. Closing twice is a no-op.
    pub fn close(&self) {
        let mut guard = self.db.write();
        if guard.take().is_some() {
            info!(path = %self.config.db_path.display(), "Closed history store");
        }
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }

    /// Get the configuration
    pub fn config(&self) -> &HistoryStoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (HistoryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = HistoryStoreConfig::default().with_db_path(temp_dir.path().join("hist.redb"));
        let store = HistoryStore::open(config).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_first_append_gets_id_one() {
        let (store, _temp) = create_test_store();

        let id = store.append(355, "enter", 34523.23322).unwrap();
        assert_eq!(id, EventId::new(1));

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(
            record,
            EventRecord {
                id: EventId::new(1),
                user_id: 355,
                action: Action::Enter,
                timestamp: 34523.23322,
            }
        );
    }

    #[test]
    fn test_ids_strictly_increase() {
        let (store, _temp) = create_test_store();

        let mut last = EventId::new(0);
        for i in 0..20 {
            let action = if i % 2 == 0 { "enter" } else { "quit" };
            let id = store.append(i, action, i as f64).unwrap();
            assert!(id > last);
            last = id;
        }
        assert_eq!(store.len().unwrap(), 20);
    }

    #[test]
    fn test_invalid_action_consumes_no_id() {
        let (store, _temp) = create_test_store();

        let err = store.append(1, "leave", 1.0).unwrap_err();
        assert!(matches!(err, StorageError::InvalidAction(ref a) if a == "leave"));
        assert!(store.is_empty().unwrap());

        let id = store.append(1, "quit", 1.0).unwrap();
        assert_eq!(id, EventId::new(1));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let (store, _temp) = create_test_store();

        store.append(7, "enter", 0.5).unwrap();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(EventId::new(1)).unwrap().is_some());
    }

    #[test]
    fn test_get_missing_row() {
        let (store, _temp) = create_test_store();
        assert!(store.get(EventId::new(99)).unwrap().is_none());
    }

    #[test]
    fn test_get_by_user_is_not_implemented() {
        let (store, _temp) = create_test_store();
        store.append(355, "enter", 1.0).unwrap();

        let err = store.get_by_user(355).unwrap_err();
        assert!(matches!(err, StorageError::NotImplemented("get_by_user")));
    }

    #[test]
    fn test_append_after_close_fails() {
        let (store, _temp) = create_test_store();
        store.append(1, "enter", 1.0).unwrap();

        store.close();
        assert!(store.is_closed());
        assert!(matches!(
            store.append(1, "quit", 2.0),
            Err(StorageError::StoreClosed)
        ));
        assert!(matches!(store.len(), Err(StorageError::StoreClosed)));

        // Second close is a no-op
        store.close();
    }

    #[test]
    fn test_sequence_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = HistoryStoreConfig::default().with_db_path(temp_dir.path().join("hist.redb"));

        {
            let store = HistoryStore::open(config.clone()).unwrap();
            for i in 0..3 {
                store.append(i, "enter", 0.0).unwrap();
            }
            store.close();
        }

        let store = HistoryStore::open(config).unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(store.append(9, "quit", 1.0).unwrap(), EventId::new(4));
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("hist.redb");
        let store = HistoryStore::open(HistoryStoreConfig::default().with_db_path(&db_path)).unwrap();

        assert!(db_path.exists());
        assert_eq!(store.config().db_path, db_path);
    }

    #[test]
    fn test_open_fails_when_path_is_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = HistoryStoreConfig::default().with_db_path(temp_dir.path());

        let err = HistoryStore::open(config).err().unwrap();
        assert!(matches!(err, StorageError::StorageUnavailable(_)));
    }
}
