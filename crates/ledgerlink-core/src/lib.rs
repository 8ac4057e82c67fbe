//! # ledgerlink core
//!
//! Pure primitives for the ledger: transactions, blocks, the canonical
//! encoding they are hashed over, and chain validation.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Block`] - One immutable record in the chain
//! - [`BlockHash`] - 32-byte BLAKE3 digest of a block's canonical content
//! - [`Transaction`] - Opaque payload unit carried by a block
//! - [`ValidationError`] - First linkage violation found in a chain
//!
//! ## Canonicalization
//!
//! Block content is encoded as deterministic CBOR before hashing. See the
//! [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod transaction;
pub mod types;
pub mod validation;

pub use block::{Block, BlockBuilder};
pub use canonical::canonical_block_bytes;
pub use crypto::digest;
pub use error::{CoreError, ValidationError, ViolationKind};
pub use transaction::Transaction;
pub use types::BlockHash;
pub use validation::{validate_chain, validate_successor};
