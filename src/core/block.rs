//! Block structure and canonical content hashing
//!
//! A block binds an ordered batch of transactions to its predecessor via
//! the predecessor's hash. The block's own hash is the SHA-256 digest of
//! its canonical serialization, which covers every field except the hash
//! itself.

use crate::core::transaction::Transaction;
use crate::crypto::sha256_hex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel `previous_hash` carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Index of the genesis block (the chain is 1-based)
pub const GENESIS_INDEX: u64 = 1;

/// A block in the ledger. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, 1 for genesis, strictly increasing
    pub index: u64,
    /// Creation time; informational only, never validated
    pub timestamp: DateTime<Utc>,
    /// Ordered batch of transactions, insertion order preserved
    pub transactions: Vec<Transaction>,
    /// Hash of the preceding block, `"0"` for genesis
    pub previous_hash: String,
    /// The nonce that satisfied the difficulty predicate
    pub nonce: u64,
    /// SHA-256 hex digest of the canonical content (all fields above)
    pub hash: String,
}

/// The hashed portion of a block, in canonical field order.
///
/// Serialization goes through this struct so the byte layout is fixed by
/// field declaration order and can never depend on map iteration order.
/// The `hash` field is deliberately absent: a hash never covers itself.
#[derive(Serialize)]
struct BlockContent<'a> {
    index: u64,
    timestamp: &'a DateTime<Utc>,
    transactions: &'a [Transaction],
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    /// Create a new block candidate with nonce 0 and the current time.
    pub fn new(index: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        let mut block = Self {
            index,
            timestamp: Utc::now(),
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Canonical serialization of the hashed fields:
    /// `index, timestamp, transactions, previous_hash, nonce`, exactly in
    /// that order. Two logically identical blocks always produce
    /// identical bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let content = BlockContent {
            index: self.index,
            timestamp: &self.timestamp,
            transactions: &self.transactions,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        };
        serde_json::to_vec(&content).expect("block content serialization")
    }

    /// Recompute the hash from the canonical content.
    pub fn compute_hash(&self) -> String {
        sha256_hex(&self.canonical_bytes())
    }

    /// Set a candidate nonce and refresh the stored hash.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.hash = self.compute_hash();
    }

    /// Check that the stored hash matches the canonical content.
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block::new(
            2,
            "abc123".to_string(),
            vec![Transaction::new("A", "B", 10.0)],
        )
    }

    #[test]
    fn test_hash_is_deterministic() {
        let block = sample_block();
        assert_eq!(block.compute_hash(), block.compute_hash());
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn test_identical_content_identical_bytes() {
        let block = sample_block();
        let copy = block.clone();
        assert_eq!(block.canonical_bytes(), copy.canonical_bytes());
        assert_eq!(block.hash, copy.hash);
    }

    #[test]
    fn test_hash_excludes_hash_field() {
        let mut block = sample_block();
        let bytes = block.canonical_bytes();
        // Overwriting the stored hash must not change the canonical content.
        block.hash = "f".repeat(64);
        assert_eq!(block.canonical_bytes(), bytes);
    }

    #[test]
    fn test_nonce_changes_hash() {
        let mut block = sample_block();
        let before = block.hash.clone();
        block.set_nonce(1);
        assert_ne!(block.hash, before);
        assert!(block.verify_hash());
    }

    #[test]
    fn test_tampered_amount_breaks_hash() {
        let mut block = sample_block();
        assert!(block.verify_hash());
        block.transactions[0].amount = 9999.0;
        assert!(!block.verify_hash());
    }
}
