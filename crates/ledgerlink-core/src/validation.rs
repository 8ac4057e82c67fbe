//! Chain validation: genesis, index contiguity, hash links and digests.

use crate::block::Block;
use crate::error::ValidationError;
use crate::types::BlockHash;

/// Walk `blocks` left to right and return the first violation.
///
/// Per block the structural checks (genesis shape, index step, predecessor
/// link) run before the digest is recomputed. A chain holding only a
/// well-formed genesis block is valid; an empty chain is not.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ValidationError> {
    let genesis = blocks.first().ok_or(ValidationError::MissingGenesis)?;
    validate_genesis(genesis)?;
    validate_hash(0, genesis)?;

    for (position, pair) in blocks.windows(2).enumerate() {
        let position = position as u64 + 1;
        validate_link(position, &pair[0], &pair[1])?;
        validate_hash(position, &pair[1])?;
    }

    Ok(())
}

/// Check that `next` may be committed directly after `prior`.
///
/// This is the local pre-commit check used by the append path. `prior` is
/// trusted, so only the new block is examined.
pub fn validate_successor(prior: &Block, next: &Block) -> Result<(), ValidationError> {
    let position = successor_index(prior.index(), prior.index(), next)?;
    validate_link(position, prior, next)?;
    validate_hash(position, next)
}

fn validate_genesis(block: &Block) -> Result<(), ValidationError> {
    if block.index() != 0 || *block.previous_hash() != BlockHash::ZERO {
        return Err(ValidationError::GenesisMismatch {
            index: block.index(),
            previous_hash: *block.previous_hash(),
        });
    }
    Ok(())
}

fn validate_link(position: u64, prior: &Block, next: &Block) -> Result<(), ValidationError> {
    let expected = successor_index(position, prior.index(), next)?;
    if next.index() != expected {
        return Err(ValidationError::IndexGap {
            position,
            expected,
            got: next.index(),
        });
    }

    if next.previous_hash() != prior.hash() {
        return Err(ValidationError::BrokenLink {
            position,
            expected: *prior.hash(),
            got: *next.previous_hash(),
        });
    }

    Ok(())
}

/// Index that must follow `prior_index`. Nothing follows `u64::MAX`.
fn successor_index(position: u64, prior_index: u64, next: &Block) -> Result<u64, ValidationError> {
    prior_index
        .checked_add(1)
        .ok_or(ValidationError::IndexGap {
            position,
            expected: u64::MAX,
            got: next.index(),
        })
}

fn validate_hash(position: u64, block: &Block) -> Result<(), ValidationError> {
    // Content that cannot be encoded can never have produced the stored hash.
    let computed = block.compute_hash().ok();
    if computed.as_ref() != Some(block.hash()) {
        return Err(ValidationError::HashMismatch {
            position,
            stored: *block.hash(),
            computed,
        });
    }
    Ok(())
}
