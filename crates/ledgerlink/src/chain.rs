//! The Chain: ordered, append-only sequence of blocks over a store.
//!
//! The chain keeps an in-memory view of the persisted sequence, loaded when
//! it is opened and extended from the store whenever the store has grown.
//! Appends are serialized: catching up, reading the tail, building the
//! successor and committing it to the store happen under one exclusive lock,
//! and the view only grows after the store has accepted the block.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use ledgerlink_core::{validate_chain, validate_successor, Block, BlockHash, Transaction};
use ledgerlink_store::{InsertResult, Store};

use crate::error::{ChainError, Result};

/// Configuration for the chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Validate the persisted sequence when opening a non-empty store.
    pub verify_on_open: bool,
    /// Transactions carried by the genesis block of a fresh chain.
    pub genesis_transactions: Vec<Transaction>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            verify_on_open: true,
            genesis_transactions: Vec::new(),
        }
    }
}

/// The in-memory view over the persisted sequence.
struct ChainView {
    blocks: Vec<Block>,
    by_hash: HashMap<BlockHash, usize>,
}

impl ChainView {
    fn new(blocks: Vec<Block>) -> Self {
        let by_hash = blocks
            .iter()
            .enumerate()
            .map(|(pos, block)| (*block.hash(), pos))
            .collect();
        Self { blocks, by_hash }
    }

    fn push(&mut self, block: Block) {
        self.by_hash.insert(*block.hash(), self.blocks.len());
        self.blocks.push(block);
    }
}

/// The main Chain struct.
///
/// Provides:
/// - Genesis bootstrap on first open
/// - Serialized appends
/// - Snapshot, hash and index lookups
/// - Verification against the backing store
///
/// The store is the source of truth. Other writers (another process on the
/// same SQLite file) may extend it; every read and append first pulls any
/// blocks the view has not seen yet.
pub struct Chain<S: Store> {
    store: Arc<S>,
    view: RwLock<ChainView>,
    /// Held for catch-up, read-tail, build, commit.
    append_lock: Mutex<()>,
}

impl<S: Store> Chain<S> {
    /// Open the chain over `store`.
    ///
    /// An empty store is seeded with a genesis block. A non-empty store is
    /// loaded as is and, when `verify_on_open` is set, refused if any block
    /// fails validation.
    pub async fn open(store: S, config: ChainConfig) -> Result<Self> {
        let mut blocks = store.all_blocks().await?;

        if blocks.is_empty() {
            let genesis = Block::genesis(config.genesis_transactions)?;
            match store.append_block(&genesis).await? {
                InsertResult::Inserted | InsertResult::AlreadyExists => blocks.push(genesis),
                // Another writer seeded the store first; adopt its genesis.
                InsertResult::Conflict { .. } => blocks = store.all_blocks().await?,
            }
            tracing::info!(hash = %blocks[0].hash(), "created genesis block");
        } else if config.verify_on_open {
            if let Err(violation) = validate_chain(&blocks) {
                tracing::warn!(
                    position = violation.position(),
                    kind = violation.kind().as_str(),
                    "refusing to open corrupt chain"
                );
                return Err(violation.into());
            }
        }

        tracing::info!(
            length = blocks.len(),
            tip = %blocks[blocks.len() - 1].hash(),
            "chain opened"
        );

        Ok(Self {
            store: Arc::new(store),
            view: RwLock::new(ChainView::new(blocks)),
            append_lock: Mutex::new(()),
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load blocks committed to the store since the view was last extended.
    ///
    /// Each loaded block must link to the current view tail; a stored
    /// successor that does not is reported as a validation error and the
    /// view is left unchanged from that block on.
    async fn catch_up(&self) -> Result<()> {
        let stored = self.store.block_count().await?;
        if stored <= self.view.read().await.blocks.len() as u64 {
            return Ok(());
        }

        let mut view = self.view.write().await;
        let mut next = view.blocks.len() as u64;
        let from = next;
        while next < stored {
            let Some(block) = self.store.get_block_at(next).await? else {
                break;
            };
            if let Some(tail) = view.blocks.last() {
                validate_successor(tail, &block)?;
            }
            view.push(block);
            next += 1;
        }

        if next > from {
            tracing::debug!(from, to = next, "view caught up with store");
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of every block in chain order.
    ///
    /// The returned vector is owned by the caller; later appends do not
    /// affect it.
    pub async fn all(&self) -> Result<Vec<Block>> {
        self.catch_up().await?;
        Ok(self.view.read().await.blocks.clone())
    }

    /// The block whose digest is `hash`, if any.
    pub async fn get_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        self.catch_up().await?;
        let view = self.view.read().await;
        Ok(view
            .by_hash
            .get(hash)
            .and_then(|&pos| view.blocks.get(pos))
            .cloned())
    }

    /// The block at `index`, if any.
    pub async fn get_by_index(&self, index: u64) -> Result<Option<Block>> {
        self.catch_up().await?;
        let view = self.view.read().await;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|pos| view.blocks.get(pos))
            .cloned())
    }

    /// The current last block. A chain always has at least its genesis.
    pub async fn tip(&self) -> Result<Block> {
        self.catch_up().await?;
        let view = self.view.read().await;
        Ok(view.blocks[view.blocks.len() - 1].clone())
    }

    /// Number of blocks, genesis included.
    pub async fn len(&self) -> Result<u64> {
        self.catch_up().await?;
        Ok(self.view.read().await.blocks.len() as u64)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a block carrying `transactions` on top of the current tail and
    /// commit it.
    ///
    /// Nothing is committed if the block cannot be built or fails the local
    /// linkage check. Store failures are returned unmodified and not retried.
    pub async fn append_transactions(&self, transactions: Vec<Transaction>) -> Result<Block> {
        let _guard = self.append_lock.lock().await;
        self.catch_up().await?;

        let tail = self.view.read().await.blocks.last().cloned();
        let block = Block::next(tail.as_ref(), transactions)?;
        if let Some(tail) = &tail {
            validate_successor(tail, &block)?;
        }

        match self.store.append_block(&block).await? {
            InsertResult::Inserted | InsertResult::AlreadyExists => {}
            InsertResult::Conflict { existing } => {
                tracing::warn!(
                    index = block.index(),
                    %existing,
                    "store already holds a different block at this index"
                );
                return Err(ChainError::Conflict {
                    index: block.index(),
                    existing,
                });
            }
        }

        {
            // A concurrent reader may already have pulled the block in.
            let mut view = self.view.write().await;
            if view.blocks.len() as u64 == block.index() {
                view.push(block.clone());
            }
        }

        tracing::debug!(
            index = block.index(),
            hash = %block.hash(),
            transactions = block.transactions().len(),
            "block appended"
        );
        Ok(block)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-read the backing store and validate every block.
    ///
    /// Returns the number of verified blocks, or the first violation as
    /// [`ChainError::Validation`].
    pub async fn verify(&self) -> Result<u64> {
        let blocks = self.store.all_blocks().await?;

        if let Err(violation) = validate_chain(&blocks) {
            tracing::warn!(
                position = violation.position(),
                kind = violation.kind().as_str(),
                "chain verification failed"
            );
            return Err(violation.into());
        }

        Ok(blocks.len() as u64)
    }
}
