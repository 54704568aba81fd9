//! Store error types.

use thiserror::Error;

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key would escape the data directory or is empty
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
