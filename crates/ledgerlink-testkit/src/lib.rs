//! # ledgerlink testkit
//!
//! Testing utilities for ledgerlink.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known block contents with their expected canonical bytes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic chains and corruption helpers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ledgerlink_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     assert_eq!(hex::encode(vector.canonical_bytes()), vector.expected_canonical_hex);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledgerlink_testkit::generators::transactions;
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(txs in transactions(8)) {
//!         let a = ledgerlink_core::digest(1, 0, &txs, &ledgerlink_core::BlockHash::ZERO).unwrap();
//!         let b = ledgerlink_core::digest(1, 0, &txs, &ledgerlink_core::BlockHash::ZERO).unwrap();
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ledgerlink_testkit::fixtures::linked_blocks;
//!
//! let blocks = linked_blocks(3);
//! assert!(ledgerlink_core::validate_chain(&blocks).is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{linked_blocks, ChainFixture};
