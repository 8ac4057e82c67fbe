//! Error types for ledgerlink core.

use thiserror::Error;

use crate::types::BlockHash;

/// Errors raised while building or encoding blocks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A non-genesis block was requested without a predecessor.
    #[error("invalid predecessor: a non-genesis block requires a prior block")]
    InvalidPredecessor,

    /// Block content cannot be canonically encoded.
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// The kind of linkage violation found by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    GenesisMismatch,
    IndexGap,
    BrokenLink,
    HashMismatch,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::GenesisMismatch => "genesis_mismatch",
            ViolationKind::IndexGap => "index_gap",
            ViolationKind::BrokenLink => "broken_link",
            ViolationKind::HashMismatch => "hash_mismatch",
        }
    }
}

/// The first violation found while walking a chain.
///
/// `position` is the offset of the offending block in the walked sequence,
/// which equals its index in any chain that is well formed up to that point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The chain has no genesis block at all.
    #[error("genesis mismatch: chain is empty")]
    MissingGenesis,

    /// Block 0 does not carry index 0 or the zero sentinel predecessor.
    #[error("genesis mismatch: index {index}, previous hash {previous_hash}")]
    GenesisMismatch { index: u64, previous_hash: BlockHash },

    #[error("index gap at position {position}: expected index {expected}, got {got}")]
    IndexGap { position: u64, expected: u64, got: u64 },

    #[error("broken link at position {position}: expected previous hash {expected}, got {got}")]
    BrokenLink {
        position: u64,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("hash mismatch at position {position}: stored {stored}, computed {computed:?}")]
    HashMismatch {
        position: u64,
        stored: BlockHash,
        /// `None` when the stored content could not be re-encoded at all.
        computed: Option<BlockHash>,
    },
}

impl ValidationError {
    /// The kind of violation, collapsing both genesis variants.
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::MissingGenesis | ValidationError::GenesisMismatch { .. } => {
                ViolationKind::GenesisMismatch
            }
            ValidationError::IndexGap { .. } => ViolationKind::IndexGap,
            ValidationError::BrokenLink { .. } => ViolationKind::BrokenLink,
            ValidationError::HashMismatch { .. } => ViolationKind::HashMismatch,
        }
    }

    /// Position of the first failing block.
    pub fn position(&self) -> u64 {
        match self {
            ValidationError::MissingGenesis | ValidationError::GenesisMismatch { .. } => 0,
            ValidationError::IndexGap { position, .. }
            | ValidationError::BrokenLink { position, .. }
            | ValidationError::HashMismatch { position, .. } => *position,
        }
    }
}
