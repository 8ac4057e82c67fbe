//! The block hasher.
//!
//! Wraps BLAKE3 with domain separation over the canonical block encoding.

use crate::canonical::canonical_block_bytes;
use crate::error::CoreError;
use crate::transaction::Transaction;
use crate::types::BlockHash;

/// Domain separator prepended to canonical bytes before hashing.
pub const BLOCK_DOMAIN: &[u8] = b"ledgerlink-block-v0:";

/// Compute the digest of a block's content.
///
/// Pure: the same four inputs always produce the same digest. Fails with
/// [`CoreError::EncodingError`] before hashing if the content cannot be
/// canonically encoded.
pub fn digest(
    index: u64,
    timestamp: i64,
    transactions: &[Transaction],
    previous_hash: &BlockHash,
) -> Result<BlockHash, CoreError> {
    let bytes = canonical_block_bytes(index, timestamp, transactions, previous_hash)?;
    Ok(hash_bytes(&bytes))
}

/// Domain-separated BLAKE3 over already-canonical bytes.
pub fn hash_bytes(canonical: &[u8]) -> BlockHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(BLOCK_DOMAIN);
    hasher.update(canonical);
    BlockHash(*hasher.finalize().as_bytes())
}
