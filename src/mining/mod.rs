//! Proof-of-work search

pub mod miner;

pub use miner::{CancelFlag, Miner, MiningError};
