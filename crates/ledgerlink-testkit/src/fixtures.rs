//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use ledgerlink::{Chain, ChainConfig};
use ledgerlink_core::{Block, BlockBuilder, BlockHash, Transaction};
use ledgerlink_store::MemoryStore;

/// Base timestamp for deterministic blocks (2023-11-14T22:13:20Z).
pub const BASE_TIMESTAMP: i64 = 1_700_000_000_000;

/// Two transactions that differ per block.
pub fn sample_transactions(seed: u64) -> Vec<Transaction> {
    vec![
        Transaction::new(format!("account-{}", seed), "treasury", seed as f64 + 0.5),
        Transaction::new("treasury", format!("account-{}", seed + 1), 1.25),
    ]
}

/// A valid chain of `len` blocks with pinned timestamps.
///
/// Block 0 is an empty genesis; every later block carries
/// [`sample_transactions`] for its index.
pub fn linked_blocks(len: usize) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::with_capacity(len);
    if len == 0 {
        return blocks;
    }

    blocks.push(
        BlockBuilder::genesis()
            .timestamp(BASE_TIMESTAMP)
            .build()
            .expect("genesis encodes"),
    );

    for i in 1..len as u64 {
        let next = BlockBuilder::after(blocks.last())
            .expect("prior exists")
            .timestamp(BASE_TIMESTAMP + i as i64)
            .transactions(sample_transactions(i))
            .build()
            .expect("block encodes");
        blocks.push(next);
    }
    blocks
}

/// A chain over a [`MemoryStore`] with helpers to corrupt the store
/// underneath it.
pub struct ChainFixture {
    pub chain: Chain<MemoryStore>,
}

impl ChainFixture {
    /// A fresh chain holding only its genesis block.
    pub async fn new() -> Self {
        let chain = Chain::open(MemoryStore::new(), ChainConfig::default())
            .await
            .expect("open memory chain");
        Self { chain }
    }

    /// A fresh chain with `appended` blocks after genesis.
    pub async fn with_blocks(appended: u64) -> Self {
        let fixture = Self::new().await;
        for i in 1..=appended {
            fixture
                .chain
                .append_transactions(sample_transactions(i))
                .await
                .expect("append block");
        }
        fixture
    }

    pub fn store(&self) -> &MemoryStore {
        self.chain.store()
    }

    /// Stored block at `index`. Panics if absent.
    pub async fn stored(&self, index: u64) -> Block {
        use ledgerlink_store::Store;
        self.store()
            .get_block_at(index)
            .await
            .expect("store read")
            .unwrap_or_else(|| panic!("no block at index {}", index))
    }

    /// Replace the transactions of the stored block at `index`, keeping its
    /// stored hash.
    pub async fn tamper_transactions(&self, index: u64, transactions: Vec<Transaction>) {
        let block = self.stored(index).await;
        self.overwrite(Block::from_parts(
            index,
            block.timestamp(),
            transactions,
            *block.previous_hash(),
            *block.hash(),
        ));
    }

    /// Point the stored block at `index` at a different predecessor, keeping
    /// its stored hash.
    pub async fn tamper_previous_hash(&self, index: u64, previous_hash: BlockHash) {
        let block = self.stored(index).await;
        self.overwrite(Block::from_parts(
            index,
            block.timestamp(),
            block.transactions().to_vec(),
            previous_hash,
            *block.hash(),
        ));
    }

    /// Overwrite the stored hash of the block at `index`.
    pub async fn tamper_hash(&self, index: u64, hash: BlockHash) {
        let block = self.stored(index).await;
        self.overwrite(Block::from_parts(
            index,
            block.timestamp(),
            block.transactions().to_vec(),
            *block.previous_hash(),
            hash,
        ));
    }

    fn overwrite(&self, block: Block) {
        self.store()
            .overwrite_block(block)
            .expect("overwrite stored block");
    }
}
