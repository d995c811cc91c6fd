//! Chain-integrity validation
//!
//! Recomputes hashes and linkage over a sequence of blocks to decide
//! well-formedness. Used at load time, before every commit, and on demand
//! as an integrity audit. Validation is read-only.

use crate::core::block::{Block, GENESIS_INDEX, GENESIS_PREVIOUS_HASH};
use thiserror::Error;

/// Reasons a chain fails validation, each carrying the index of the
/// offending block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("broken linkage at block {0}: previous_hash does not match predecessor")]
    BrokenLinkage(u64),
    #[error("hash mismatch at block {0}: stored hash does not match content")]
    HashMismatch(u64),
    #[error("index gap at block {0}: indexes must increase by exactly 1")]
    IndexGap(u64),
}

/// Validate a full chain.
///
/// An empty chain is trivially valid. A non-empty chain must start with a
/// well-formed genesis block (index 1, previous_hash `"0"`) and every
/// subsequent block must link to its predecessor.
pub fn validate(chain: &[Block]) -> Result<(), ValidationError> {
    let Some(first) = chain.first() else {
        return Ok(());
    };

    if first.index != GENESIS_INDEX {
        return Err(ValidationError::IndexGap(first.index));
    }
    if first.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(ValidationError::BrokenLinkage(first.index));
    }
    if !first.verify_hash() {
        return Err(ValidationError::HashMismatch(first.index));
    }

    for window in chain.windows(2) {
        validate_link(&window[0], &window[1])?;
    }

    Ok(())
}

/// Validate a single link: `block` must extend `prev`.
///
/// This is the per-block routine `validate` iterates; the ledger runs it
/// against the chain tip before committing a freshly mined block, which is
/// equivalent to validating `chain + [block]` given the prefix was already
/// validated.
pub fn validate_link(prev: &Block, block: &Block) -> Result<(), ValidationError> {
    if block.index != prev.index + 1 {
        return Err(ValidationError::IndexGap(block.index));
    }
    if block.previous_hash != prev.hash {
        return Err(ValidationError::BrokenLinkage(block.index));
    }
    if !block.verify_hash() {
        return Err(ValidationError::HashMismatch(block.index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;

    fn build_chain(len: usize) -> Vec<Block> {
        let mut chain = Vec::with_capacity(len);
        let mut previous_hash = GENESIS_PREVIOUS_HASH.to_string();
        for i in 0..len {
            let block = Block::new(
                (i + 1) as u64,
                previous_hash.clone(),
                vec![Transaction::new("A", "B", i as f64)],
            );
            previous_hash = block.hash.clone();
            chain.push(block);
        }
        chain
    }

    #[test]
    fn test_empty_chain_is_valid() {
        assert_eq!(validate(&[]), Ok(()));
    }

    #[test]
    fn test_valid_chain() {
        let chain = build_chain(4);
        assert_eq!(validate(&chain), Ok(()));
    }

    #[test]
    fn test_linkage_invariant() {
        let chain = build_chain(5);
        for window in chain.windows(2) {
            assert_eq!(window[1].previous_hash, window[0].hash);
        }
    }

    #[test]
    fn test_genesis_must_have_index_one() {
        let mut chain = build_chain(3);
        chain.remove(0);
        assert_eq!(validate(&chain), Err(ValidationError::IndexGap(2)));
    }

    #[test]
    fn test_genesis_must_carry_sentinel() {
        let mut chain = build_chain(1);
        chain[0].previous_hash = "deadbeef".to_string();
        chain[0].hash = chain[0].compute_hash();
        assert_eq!(validate(&chain), Err(ValidationError::BrokenLinkage(1)));
    }

    #[test]
    fn test_broken_linkage_detected() {
        let mut chain = build_chain(3);
        chain[2].previous_hash = "deadbeef".to_string();
        chain[2].hash = chain[2].compute_hash();
        assert_eq!(validate(&chain), Err(ValidationError::BrokenLinkage(3)));
    }

    #[test]
    fn test_index_gap_detected() {
        let mut chain = build_chain(3);
        chain[2].index = 7;
        chain[2].hash = chain[2].compute_hash();
        assert_eq!(validate(&chain), Err(ValidationError::IndexGap(7)));
    }

    #[test]
    fn test_tampered_transaction_yields_hash_mismatch() {
        let mut chain = build_chain(4);
        // Flip one amount without re-hashing: the stored hash no longer
        // covers the content.
        chain[2].transactions[0].amount = 1_000_000.0;
        assert_eq!(validate(&chain), Err(ValidationError::HashMismatch(3)));
    }
}
