//! Block: one immutable record in the chain.
//!
//! A block's digest is computed exactly once, when it is built. There are no
//! mutators: changed content means a new block, and stored content that no
//! longer matches its digest is caught by [`crate::validate_chain`].

use serde::{Deserialize, Serialize};

use crate::crypto::digest;
use crate::error::CoreError;
use crate::transaction::Transaction;
use crate::types::BlockHash;

/// A hash-linked block.
///
/// Serializes as `{index, timestamp, transactions, previousHash, hash}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    index: u64,
    timestamp: i64,
    transactions: Vec<Transaction>,
    previous_hash: BlockHash,
    hash: BlockHash,
    /// Stored transactions could not be read back; `transactions` is empty
    /// and the digest cannot be recomputed.
    #[serde(skip)]
    undecodable: bool,
}

impl Block {
    /// Build the genesis block at the current time.
    pub fn genesis(transactions: Vec<Transaction>) -> Result<Self, CoreError> {
        BlockBuilder::genesis().transactions(transactions).build()
    }

    /// Build the successor of `prior` at the current time.
    ///
    /// Fails with [`CoreError::InvalidPredecessor`] when `prior` is absent.
    pub fn next(prior: Option<&Block>, transactions: Vec<Transaction>) -> Result<Self, CoreError> {
        BlockBuilder::after(prior)?.transactions(transactions).build()
    }

    /// Reassemble a block from stored fields without recomputing its hash.
    ///
    /// Storage backends use this to rehydrate records. A record whose content
    /// was altered after the fact keeps its old hash and fails validation.
    pub fn from_parts(
        index: u64,
        timestamp: i64,
        transactions: Vec<Transaction>,
        previous_hash: BlockHash,
        hash: BlockHash,
    ) -> Self {
        Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash,
            undecodable: false,
        }
    }

    /// Reassemble a stored block whose transactions no longer decode.
    ///
    /// The block keeps its position and links so the rest of the chain can be
    /// checked, but [`Block::compute_hash`] always fails for it.
    pub fn undecodable(index: u64, timestamp: i64, previous_hash: BlockHash, hash: BlockHash) -> Self {
        Self {
            index,
            timestamp,
            transactions: Vec::new(),
            previous_hash,
            hash,
            undecodable: true,
        }
    }

    /// Whether this block was rehydrated from unreadable transactions.
    pub fn is_undecodable(&self) -> bool {
        self.undecodable
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Creation time (Unix milliseconds).
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    /// The digest stored at construction.
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Recompute the digest over the stored content.
    pub fn compute_hash(&self) -> Result<BlockHash, CoreError> {
        if self.undecodable {
            return Err(CoreError::DecodingError(format!(
                "transactions of block {} are unreadable",
                self.index
            )));
        }
        digest(
            self.index,
            self.timestamp,
            &self.transactions,
            &self.previous_hash,
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_zero()
    }
}

/// Builder for new blocks.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    index: u64,
    previous_hash: BlockHash,
    timestamp: Option<i64>,
    transactions: Vec<Transaction>,
}

impl BlockBuilder {
    /// Start a genesis block: index 0, zero sentinel predecessor.
    pub fn genesis() -> Self {
        Self {
            index: 0,
            previous_hash: BlockHash::ZERO,
            timestamp: None,
            transactions: Vec::new(),
        }
    }

    /// Start the block following `prior`.
    pub fn after(prior: Option<&Block>) -> Result<Self, CoreError> {
        let prior = prior.ok_or(CoreError::InvalidPredecessor)?;
        let index = prior
            .index
            .checked_add(1)
            .ok_or(CoreError::InvalidPredecessor)?;

        Ok(Self {
            index,
            previous_hash: prior.hash,
            timestamp: None,
            transactions: Vec::new(),
        })
    }

    /// Pin the timestamp instead of using the construction time.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn add_transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    /// Hash the content and produce the block.
    pub fn build(self) -> Result<Block, CoreError> {
        let timestamp = self.timestamp.unwrap_or_else(now_millis);
        let hash = digest(self.index, timestamp, &self.transactions, &self.previous_hash)?;

        Ok(Block {
            index: self.index,
            timestamp,
            transactions: self.transactions,
            previous_hash: self.previous_hash,
            hash,
            undecodable: false,
        })
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64) -> Transaction {
        Transaction::new("A", "B", amount)
    }

    #[test]
    fn test_genesis_shape() {
        let genesis = Block::genesis(vec![]).unwrap();
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_hash(), &BlockHash::ZERO);
        assert!(genesis.transactions().is_empty());
        assert!(genesis.is_genesis());
        assert_eq!(genesis.compute_hash().unwrap(), *genesis.hash());
        assert!(!genesis.hash().is_zero());
    }

    #[test]
    fn test_next_links_to_prior() {
        let genesis = BlockBuilder::genesis().timestamp(1000).build().unwrap();
        let next = Block::next(Some(&genesis), vec![tx(5.0)]).unwrap();

        assert_eq!(next.index(), 1);
        assert_eq!(next.previous_hash(), genesis.hash());
        assert_eq!(next.transactions(), &[tx(5.0)]);
        assert_eq!(next.compute_hash().unwrap(), *next.hash());
        assert!(!next.is_genesis());
    }

    #[test]
    fn test_next_without_prior_fails() {
        let result = Block::next(None, vec![tx(1.0)]);
        assert_eq!(result, Err(CoreError::InvalidPredecessor));
    }

    #[test]
    fn test_next_rejects_non_finite_amount() {
        let genesis = Block::genesis(vec![]).unwrap();
        let result = Block::next(Some(&genesis), vec![tx(f64::NAN)]);
        assert!(matches!(result, Err(CoreError::EncodingError(_))));
    }

    #[test]
    fn test_identical_content_identical_hash() {
        let a = BlockBuilder::genesis()
            .timestamp(1736870400000)
            .add_transaction(tx(1.0))
            .build()
            .unwrap();
        let b = BlockBuilder::genesis()
            .timestamp(1736870400000)
            .add_transaction(tx(1.0))
            .build()
            .unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_parts_keeps_stored_hash() {
        let block = BlockBuilder::genesis().timestamp(5).build().unwrap();
        let forged = Block::from_parts(
            block.index(),
            block.timestamp(),
            vec![tx(99.0)],
            *block.previous_hash(),
            *block.hash(),
        );

        assert_eq!(forged.hash(), block.hash());
        assert_ne!(forged.compute_hash().unwrap(), *forged.hash());
    }

    #[test]
    fn test_undecodable_block_cannot_be_rehashed() {
        let block = BlockBuilder::genesis().timestamp(5).add_transaction(tx(1.0)).build().unwrap();
        let stored = Block::undecodable(0, 5, BlockHash::ZERO, *block.hash());

        assert!(stored.is_undecodable());
        assert!(stored.transactions().is_empty());
        assert_eq!(stored.hash(), block.hash());
        assert!(matches!(stored.compute_hash(), Err(CoreError::DecodingError(_))));
        assert_ne!(stored, block);
        assert!(!block.is_undecodable());
    }

    #[test]
    fn test_index_overflow_is_invalid_predecessor() {
        let last = Block::from_parts(u64::MAX, 0, vec![], BlockHash::ZERO, BlockHash::ZERO);
        assert_eq!(
            BlockBuilder::after(Some(&last)).unwrap_err(),
            CoreError::InvalidPredecessor
        );
    }

    #[test]
    fn test_json_field_names() {
        let block = BlockBuilder::genesis().timestamp(42).build().unwrap();
        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["index"], 0);
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["transactions"], serde_json::json!([]));
        assert_eq!(json["previousHash"], "00".repeat(32));
        assert_eq!(json["hash"], block.hash().to_hex());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
