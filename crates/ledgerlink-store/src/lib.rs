//! # ledgerlink store
//!
//! Storage abstraction for the ledger. Provides a trait-based interface for
//! block persistence with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of appending a block
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledgerlink_core::Block;
//! use ledgerlink_store::{SqliteStore, Store, InsertResult};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     let genesis = Block::genesis(vec![]).unwrap();
//!     let result = store.append_block(&genesis).await.unwrap();
//!     assert_eq!(result, InsertResult::Inserted);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Ordered**: blocks are keyed by index and must arrive in index order
//! - **Idempotent appends**: appending the same block twice returns `AlreadyExists`
//! - **Conflict detection**: a different block at an occupied index returns `Conflict`
//! - **No validation**: stores persist what they are given; linkage is the
//!   chain's concern

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
