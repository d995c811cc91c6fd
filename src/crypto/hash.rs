//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 digest used for block hashes and the difficulty
//! predicate that proof-of-work searches against.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default mining difficulty (number of leading zero hex characters)
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Computes the SHA-256 hash of the input and returns it as a lowercase
/// hex string. Pure function: same bytes in, same digest out.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Proof-of-work difficulty: the number of leading `'0'` hex characters a
/// block hash must carry to be accepted.
///
/// A difficulty of 0 accepts any hash immediately (degenerate, useful in
/// tests). Difficulty is constant for the lifetime of a ledger instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty(pub u32);

impl Difficulty {
    /// Check whether a hex-encoded hash satisfies this difficulty.
    pub fn is_met(&self, hash: &str) -> bool {
        hash.chars().take(self.0 as usize).all(|c| c == '0')
            && hash.len() >= self.0 as usize
    }

    /// The required leading-zero prefix, e.g. `"0000"` at difficulty 4.
    pub fn prefix(&self) -> String {
        "0".repeat(self.0 as usize)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(DEFAULT_DIFFICULTY)
    }
}
