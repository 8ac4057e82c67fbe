//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical byte layout a block digest is computed
//! over. Any change to the encoding shows up here first.

use ledgerlink_core::{canonical_block_bytes, digest, BlockHash, Transaction};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub index: u64,
    pub timestamp: i64,
    /// `(from, to, amount)` triples.
    pub transactions: &'static [(&'static str, &'static str, f64)],
    pub previous_hash: [u8; 32],
    /// Expected canonical bytes (hex).
    pub expected_canonical_hex: &'static str,
}

impl GoldenVector {
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .map(|&(from, to, amount)| Transaction::new(from, to, amount))
            .collect()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_block_bytes(
            self.index,
            self.timestamp,
            &self.transactions(),
            &BlockHash::from_bytes(self.previous_hash),
        )
        .expect("golden vector encodes")
    }

    pub fn digest(&self) -> BlockHash {
        digest(
            self.index,
            self.timestamp,
            &self.transactions(),
            &BlockHash::from_bytes(self.previous_hash),
        )
        .expect("golden vector encodes")
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty genesis at epoch",
            index: 0,
            timestamp: 0,
            transactions: &[],
            previous_hash: [0; 32],
            expected_canonical_hex: "a4000001000280035820\
                0000000000000000000000000000000000000000000000000000000000000000",
        },
        GoldenVector {
            name: "genesis with mint",
            index: 0,
            timestamp: 1_700_000_000_000,
            transactions: &[("mint", "treasury", 1000.0)],
            previous_hash: [0; 32],
            expected_canonical_hex: "a40000011b0000018bcfe5680002\
                81a300646d696e740168747265617375727902fb408f400000000000\
                035820\
                0000000000000000000000000000000000000000000000000000000000000000",
        },
        GoldenVector {
            name: "two transfers with negative amount",
            index: 1,
            timestamp: 1_700_000_000_001,
            transactions: &[("A", "B", 5.0), ("B", "C", -2.5)],
            previous_hash: [0x11; 32],
            expected_canonical_hex: "a40001011b0000018bcfe5680102\
                82a300614101614202fb4014000000000000\
                a300614201614302fbc004000000000000\
                035820\
                1111111111111111111111111111111111111111111111111111111111111111",
        },
    ]
}
