//! Proof-of-work mining engine
//!
//! Iterates candidate nonces until a block's hash satisfies the difficulty
//! predicate. The search is CPU-bound and unbounded by design, so it works
//! on an owned snapshot of the transaction set, holds no ledger locks, and
//! checks a cancellation flag on every iteration.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use crate::crypto::Difficulty;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors a proof-of-work search can end with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    #[error("proof-of-work search exhausted the nonce space")]
    SearchExhausted,
    #[error("proof-of-work search was cancelled")]
    Cancelled,
}

/// Cooperative cancellation handle for an in-flight search.
///
/// Cloning shares the flag: any holder can cancel, every holder observes
/// it. Cancellation before the commit step is a full no-op on ledger state.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of any search observing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof-of-work miner bound to a fixed difficulty
#[derive(Debug, Clone, Copy)]
pub struct Miner {
    difficulty: Difficulty,
}

impl Miner {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Search for a block whose hash satisfies the difficulty predicate.
    ///
    /// Starting at nonce 0, builds a candidate with the given index,
    /// predecessor hash and transaction snapshot, then increments the
    /// nonce until the predicate holds. Nonce overflow is an explicit
    /// `SearchExhausted` error, never a silent wrap. The caller's pending
    /// buffer is untouched: `transactions` is an owned snapshot.
    pub fn find_valid_block(
        &self,
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        cancel: &CancelFlag,
    ) -> Result<Block, MiningError> {
        let start = Instant::now();
        let mut block = Block::new(index, previous_hash, transactions);
        let mut nonce: u64 = 0;
        let mut attempts: u64 = 0;

        info!(
            "mining block {} at difficulty {}...",
            block.index, self.difficulty.0
        );

        loop {
            if cancel.is_cancelled() {
                info!("mining block {} cancelled after {} attempts", block.index, attempts);
                return Err(MiningError::Cancelled);
            }

            block.set_nonce(nonce);
            attempts += 1;

            if self.difficulty.is_met(&block.hash) {
                let elapsed = start.elapsed().as_millis();
                let hash_rate = if elapsed > 0 {
                    attempts as f64 / (elapsed as f64 / 1000.0)
                } else {
                    attempts as f64
                };
                info!(
                    "block {} mined in {}ms ({} attempts, {:.2} H/s)",
                    block.index, elapsed, attempts, hash_rate
                );
                return Ok(block);
            }

            nonce = nonce.checked_add(1).ok_or(MiningError::SearchExhausted)?;
        }
    }
}
