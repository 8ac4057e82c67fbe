//! Volatile block store.
//!
//! Append and lookup rules match [`crate::SqliteStore`]; nothing survives a
//! restart. Used by tests and the testkit fixtures.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use ledgerlink_core::{Block, BlockHash};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// Blocks held in a `Vec` behind a `RwLock`, indexed by hash.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Blocks in index order; position == index.
    blocks: Vec<Block>,

    /// Hash index: hash -> block index.
    by_hash: HashMap<BlockHash, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    /// Replace the stored block at `block.index()` without any checks.
    ///
    /// Simulates out-of-band corruption of the backing store.
    #[cfg(feature = "testing")]
    pub fn overwrite_block(&self, block: Block) -> Result<()> {
        let mut inner = self.write()?;
        let index = block.index();
        let slot = inner
            .blocks
            .get_mut(index as usize)
            .ok_or_else(|| StoreError::InvalidData(format!("no block at index {}", index)))?;

        let old_hash = *slot.hash();
        *slot = block;
        let new_hash = *slot.hash();

        inner.by_hash.remove(&old_hash);
        inner.by_hash.insert(new_hash, index);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn append_block(&self, block: &Block) -> Result<InsertResult> {
        let mut inner = self.write()?;
        let index = block.index();

        if let Some(existing) = inner.blocks.get(index as usize) {
            if existing.hash() == block.hash() {
                return Ok(InsertResult::AlreadyExists);
            }
            return Ok(InsertResult::Conflict {
                existing: *existing.hash(),
            });
        }

        let expected = inner.blocks.len() as u64;
        if index != expected {
            return Err(StoreError::OutOfOrder {
                expected,
                got: index,
            });
        }

        if let Some(&other) = inner.by_hash.get(block.hash()) {
            return Err(StoreError::InvalidData(format!(
                "hash {} already stored at index {}",
                block.hash(),
                other
            )));
        }

        inner.by_hash.insert(*block.hash(), index);
        inner.blocks.push(block.clone());

        Ok(InsertResult::Inserted)
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let inner = self.read()?;
        Ok(inner
            .by_hash
            .get(hash)
            .and_then(|&index| inner.blocks.get(index as usize))
            .cloned())
    }

    async fn get_block_at(&self, index: u64) -> Result<Option<Block>> {
        let inner = self.read()?;
        Ok(inner.blocks.get(index as usize).cloned())
    }

    async fn all_blocks(&self) -> Result<Vec<Block>> {
        let inner = self.read()?;
        Ok(inner.blocks.clone())
    }

    async fn tip(&self) -> Result<Option<Block>> {
        let inner = self.read()?;
        Ok(inner.blocks.last().cloned())
    }

    async fn block_count(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.blocks.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlink_core::{BlockBuilder, Transaction};

    fn make_chain(len: usize) -> Vec<Block> {
        let mut blocks = vec![BlockBuilder::genesis().timestamp(1234567890000).build().unwrap()];
        for i in 1..len {
            let next = BlockBuilder::after(blocks.last())
                .unwrap()
                .timestamp(1234567890000 + i as i64)
                .add_transaction(Transaction::new("A", "B", i as f64))
                .build()
                .unwrap();
            blocks.push(next);
        }
        blocks
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let chain = make_chain(3);

        for block in &chain {
            let result = store.append_block(block).await.unwrap();
            assert_eq!(result, InsertResult::Inserted);
        }

        assert_eq!(store.block_count().await.unwrap(), 3);
        assert_eq!(store.all_blocks().await.unwrap(), chain);
        assert_eq!(store.tip().await.unwrap().as_ref(), chain.last());
        assert_eq!(store.get_block_at(1).await.unwrap().as_ref(), Some(&chain[1]));
        assert_eq!(
            store.get_block(chain[2].hash()).await.unwrap().as_ref(),
            Some(&chain[2])
        );
    }

    #[tokio::test]
    async fn test_memory_store_missing_lookups() {
        let store = MemoryStore::new();
        assert_eq!(store.tip().await.unwrap(), None);
        assert_eq!(store.get_block_at(0).await.unwrap(), None);
        assert_eq!(
            store.get_block(&BlockHash::from_bytes([9; 32])).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_memory_store_idempotent() {
        let store = MemoryStore::new();
        let chain = make_chain(1);

        let r1 = store.append_block(&chain[0]).await.unwrap();
        assert_eq!(r1, InsertResult::Inserted);

        let r2 = store.append_block(&chain[0]).await.unwrap();
        assert_eq!(r2, InsertResult::AlreadyExists);
        assert_eq!(store.block_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_conflict() {
        let store = MemoryStore::new();
        let chain = make_chain(2);
        store.append_block(&chain[0]).await.unwrap();
        store.append_block(&chain[1]).await.unwrap();

        let rival = BlockBuilder::after(Some(&chain[0]))
            .unwrap()
            .timestamp(1)
            .build()
            .unwrap();
        let result = store.append_block(&rival).await.unwrap();
        assert_eq!(
            result,
            InsertResult::Conflict {
                existing: *chain[1].hash()
            }
        );
    }

    #[tokio::test]
    async fn test_memory_store_rejects_gap() {
        let store = MemoryStore::new();
        let chain = make_chain(3);
        store.append_block(&chain[0]).await.unwrap();

        let err = store.append_block(&chain[2]).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfOrder { expected: 1, got: 2 }));
    }

    #[cfg(feature = "testing")]
    #[tokio::test]
    async fn test_overwrite_block() {
        let store = MemoryStore::new();
        let chain = make_chain(2);
        for block in &chain {
            store.append_block(block).await.unwrap();
        }

        let forged = Block::from_parts(
            1,
            chain[1].timestamp(),
            vec![],
            *chain[1].previous_hash(),
            *chain[1].hash(),
        );
        store.overwrite_block(forged.clone()).unwrap();

        assert_eq!(store.get_block_at(1).await.unwrap(), Some(forged));
    }
}
