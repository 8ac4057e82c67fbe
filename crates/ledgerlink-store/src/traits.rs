//! Store trait: the abstract interface for block persistence.
//!
//! This trait allows the chain to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use ledgerlink_core::{Block, BlockHash};

use crate::error::Result;

/// Result of appending a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Block was appended.
    Inserted,
    /// The identical block is already stored at that index (not an error).
    AlreadyExists,
    /// A different block already occupies that index.
    Conflict {
        /// The hash of the block stored at the index.
        existing: BlockHash,
    },
}

/// The Store trait: async interface for block persistence.
///
/// The store behaves as an ordered map keyed by block index with a secondary
/// lookup by hash. It performs no linkage validation of its own.
///
/// # Design Notes
///
/// - **Append only**: there is no update or delete.
/// - **In order**: `append_block` accepts only the next free index (or an
///   occupied one, reported as `AlreadyExists`/`Conflict`); a gap is
///   rejected with [`crate::StoreError::OutOfOrder`].
/// - **No retries**: failures are reported as-is to the caller.
#[async_trait]
pub trait Store: Send + Sync {
    /// Append a block at `block.index()`.
    ///
    /// # Returns
    /// - `Inserted` if the block was new.
    /// - `AlreadyExists` if the exact same block is stored at that index.
    /// - `Conflict` if a different block occupies the index.
    async fn append_block(&self, block: &Block) -> Result<InsertResult>;

    /// Get a block by its digest.
    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>>;

    /// Get a block by its index.
    async fn get_block_at(&self, index: u64) -> Result<Option<Block>>;

    /// All blocks, ordered by index.
    async fn all_blocks(&self) -> Result<Vec<Block>>;

    /// The block with the highest index.
    async fn tip(&self) -> Result<Option<Block>>;

    /// Number of stored blocks.
    async fn block_count(&self) -> Result<u64>;
}
