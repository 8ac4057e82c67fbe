//! Persistence errors.

use thiserror::Error;

/// Failures of a storage backend. The chain passes these through unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected a statement, or a stored row could not be read back.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A block's transactions could not be encoded for the transactions column.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Append skipped ahead of the next free index.
    #[error("out of order append: expected index {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("migration error: {0}")]
    Migration(String),

    /// A writer panicked while holding a backend lock.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// The blocking worker running a query was cancelled or panicked.
    #[error("background task failed: {0}")]
    Task(String),

    /// Creating the database location failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
