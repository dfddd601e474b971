//! Error types for hanita-storage
//!
//! This module defines the error types used throughout the storage crate.

use thiserror::Error;

/// Errors that can occur in history store operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be created, opened, read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Action outside the `enter`/`quit` enumeration
    #[error("Invalid action: {0:?}")]
    InvalidAction(String),

    /// Write attempted after the store was closed
    #[error("Store is closed")]
    StoreClosed,

    /// Operation declared but deliberately not supported
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// A stored row could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored row could not be decoded
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::StorageUnavailable(err.to_string())
    }
}

impl StorageError {
    /// Wrap any backend failure as `StorageUnavailable`
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }

    /// Create a new Serialization error
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Create a new Deserialization error
    pub fn deserialization(err: impl std::fmt::Display) -> Self {
        Self::Deserialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::StorageUnavailable(_)));
        assert!(storage_err.to_string().contains("read-only"));
    }

    #[test]
    fn test_invalid_action_display() {
        let err = StorageError::InvalidAction("leave".into());
        assert_eq!(err.to_string(), "Invalid action: \"leave\"");
    }

    #[test]
    fn test_store_closed_error() {
        let err = StorageError::StoreClosed;
        assert!(matches!(err, StorageError::StoreClosed));
    }
}
