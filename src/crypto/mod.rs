//! Cryptographic hashing for the ledger

pub mod hash;

pub use hash::{sha256_hex, Difficulty, DEFAULT_DIFFICULTY};
