//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ledgerlink_core::{BlockHash, Transaction};

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate an account name.
pub fn account() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,15}".prop_map(String::from)
}

/// Generate a finite amount.
pub fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..=1_000_000i64).prop_map(|n| n as f64),
        (-1.0e9f64..1.0e9f64),
        Just(0.0),
    ]
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate an encodable transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    (account(), account(), amount()).prop_map(|(from, to, amount)| Transaction::new(from, to, amount))
}

/// Generate up to `max_len` transactions.
pub fn transactions(max_len: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction(), 0..=max_len)
}

/// Generate a batch of transaction lists, one per block to append.
pub fn batches(max_blocks: usize, max_txs: usize) -> impl Strategy<Value = Vec<Vec<Transaction>>> {
    prop::collection::vec(transactions(max_txs), 1..=max_blocks)
}
