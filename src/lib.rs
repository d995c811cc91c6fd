//! onchain: a tamper-evident proof-of-work transaction ledger
//!
//! This crate maintains an append-only ledger of transaction batches
//! (blocks), each cryptographically bound to its predecessor. New blocks
//! are admitted only after a proof-of-work puzzle is solved, and the whole
//! chain re-validates from its hashes alone, so any tampering with
//! committed history is detectable.
//!
//! Features:
//! - Canonical block serialization and SHA-256 content hashing
//! - Proof-of-work mining with cancellable, lock-free search
//! - Chain-integrity validation at load time and on demand
//! - SQLite-backed append-only persistence
//! - REST API (submit transaction / mine / read chain)
//!
//! # Example
//!
//! ```rust
//! use onchain::core::Ledger;
//! use onchain::crypto::Difficulty;
//! use onchain::mining::CancelFlag;
//! use onchain::storage::MemoryStore;
//!
//! // Open a ledger; an empty store gets a genesis block.
//! let ledger = Ledger::open(Box::new(MemoryStore::new()), Difficulty(1)).unwrap();
//!
//! // Buffer a transaction and mine it into the next block.
//! ledger.add_transaction("alice", "bob", 10.0);
//! let block = ledger.mine_block(&CancelFlag::new()).unwrap();
//!
//! assert_eq!(block.index, 2);
//! assert!(ledger.validate().is_ok());
//! ```

pub mod api;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use core::{Block, Ledger, LedgerError, Transaction, ValidationError};
pub use crypto::{Difficulty, DEFAULT_DIFFICULTY};
pub use mining::{CancelFlag, Miner, MiningError};
pub use storage::{BlockStore, MemoryStore, SqliteStore, StorageError};
