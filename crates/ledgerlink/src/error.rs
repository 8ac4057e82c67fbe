//! Error types for the chain.

use ledgerlink_core::{BlockHash, CoreError, ValidationError};
use ledgerlink_store::StoreError;
use thiserror::Error;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Block construction failed (no predecessor, unencodable content).
    #[error("block error: {0}")]
    Core(#[from] CoreError),

    /// The chain, or a block about to be committed, violates linkage.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage backend failed. Not retried.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Another writer already committed a different block at this index.
    #[error("conflict at index {index}: existing block {existing}")]
    Conflict { index: u64, existing: BlockHash },
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
