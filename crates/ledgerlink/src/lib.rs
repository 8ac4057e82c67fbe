//! # ledgerlink
//!
//! A minimal single-node ledger: an append-only, hash-linked sequence of
//! blocks with a single authoritative writer.
//!
//! ## Key Concepts
//!
//! - **Block**: Immutable. Never edited. Changed content means a new block.
//! - **Genesis**: Created exactly once when a chain is first opened.
//! - **Append**: Serialized; read tail, build successor, commit is one step.
//! - **Verify**: Recomputes every digest from storage and checks every link.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledgerlink::{Chain, ChainConfig, Transaction};
//! use ledgerlink::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let chain = Chain::open(store, ChainConfig::default()).await.unwrap();
//!
//!     let block = chain
//!         .append_transactions(vec![Transaction::new("A", "B", 5.0)])
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(chain.get_by_hash(block.hash()).await.unwrap(), Some(block));
//!     chain.verify().await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ledgerlink::core` - Core primitives (Block, BlockHash, validation)
//! - `ledgerlink::store` - Storage abstraction and SQLite

pub mod chain;
pub mod error;

pub use ledgerlink_core as core;
pub use ledgerlink_store as store;

pub use chain::{Chain, ChainConfig};
pub use error::{ChainError, Result};

pub use ledgerlink_core::{
    Block, BlockBuilder, BlockHash, CoreError, Transaction, ValidationError, ViolationKind,
};
