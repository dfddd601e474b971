//! Error types for the history service

use thiserror::Error;

/// Errors that can occur while starting or stopping the service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    BindFailure {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] hanita_storage::StorageError),

    /// The accept loop task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServiceError::Task(e.to_string())
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
