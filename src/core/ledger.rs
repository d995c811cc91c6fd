//! Ledger orchestration
//!
//! The `Ledger` owns the committed chain and the pending-transaction
//! buffer. It is constructed once per process: on open it loads every
//! persisted block, validates the lot, and synthesizes a genesis block if
//! the store is empty. Afterwards the chain only grows at its tail, one
//! mined block at a time.
//!
//! Locking discipline: the chain sits behind a `RwLock`, the pending
//! buffer behind a `Mutex`, and neither is held across the unbounded
//! proof-of-work search. Only the brief validate-and-commit step takes the
//! chain write lock. Mining is serialized by an atomic slot; a second
//! `mine_block` while one is in flight is rejected with
//! `MiningInProgress`.

use crate::core::block::{Block, GENESIS_INDEX, GENESIS_PREVIOUS_HASH};
use crate::core::transaction::Transaction;
use crate::core::validator::{self, ValidationError};
use crate::crypto::Difficulty;
use crate::mining::{CancelFlag, Miner, MiningError};
use crate::storage::{BlockStore, StorageError};
use log::{error, info};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Ledger-level errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The persisted chain failed validation at load time. Fatal: the
    /// ledger refuses to start on corrupt data.
    #[error("corrupt ledger: {0}")]
    CorruptLedger(ValidationError),
    /// A freshly mined block failed the pre-commit validation pass.
    #[error("mined block rejected: {0}")]
    InvalidBlock(ValidationError),
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
    #[error(transparent)]
    Mining(#[from] MiningError),
    /// A mining operation is already in flight; retry later.
    #[error("mining already in progress")]
    MiningInProgress,
}

/// The ledger: committed chain, pending buffer, miner and durable store.
pub struct Ledger {
    chain: RwLock<Vec<Block>>,
    pending: Mutex<Vec<Transaction>>,
    miner: Miner,
    store: Box<dyn BlockStore>,
    mining: AtomicBool,
}

/// Releases the mining slot when the mining attempt ends, however it ends.
struct MiningSlot<'a>(&'a AtomicBool);

impl Drop for MiningSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Ledger {
    /// Open a ledger over a durable store.
    ///
    /// Loads all persisted blocks and validates them; a non-empty chain
    /// that fails validation aborts construction with `CorruptLedger`.
    /// An empty store gets a genesis block (index 1, previous hash `"0"`,
    /// no transactions), mined under the active difficulty and committed
    /// through the same append path as every later block.
    pub fn open(store: Box<dyn BlockStore>, difficulty: Difficulty) -> Result<Self, LedgerError> {
        let blocks = store.load_all()?;
        validator::validate(&blocks).map_err(LedgerError::CorruptLedger)?;

        let ledger = Self {
            chain: RwLock::new(blocks),
            pending: Mutex::new(Vec::new()),
            miner: Miner::new(difficulty),
            store,
            mining: AtomicBool::new(false),
        };

        if ledger.chain.read().is_empty() {
            info!("empty store, mining genesis block");
            let genesis = ledger.miner.find_valid_block(
                GENESIS_INDEX,
                GENESIS_PREVIOUS_HASH.to_string(),
                Vec::new(),
                &CancelFlag::new(),
            )?;
            ledger.commit(genesis)?;
        } else {
            info!("loaded {} blocks from store", ledger.chain.read().len());
        }

        Ok(ledger)
    }

    /// The active proof-of-work difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.miner.difficulty()
    }

    /// Buffer a transaction for inclusion in the next mined block.
    /// Always succeeds; safe to call while a mining operation is in
    /// flight.
    pub fn add_transaction(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
    ) {
        self.pending
            .lock()
            .push(Transaction::new(sender, receiver, amount));
    }

    /// Mine and commit the next block.
    ///
    /// Snapshots the pending buffer and the chain tip, releases all locks,
    /// and runs the proof-of-work search on the snapshot. On success the
    /// block is validated against the tip, appended to the durable store,
    /// then published in memory, and exactly the captured transactions are
    /// drained from the buffer; transactions added after the snapshot stay
    /// pending. Any failure leaves chain and buffer exactly as they were.
    pub fn mine_block(&self, cancel: &CancelFlag) -> Result<Block, LedgerError> {
        if self
            .mining
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(LedgerError::MiningInProgress);
        }
        let _slot = MiningSlot(&self.mining);

        let (index, previous_hash) = {
            let chain = self.chain.read();
            let tip = chain.last().expect("chain has at least the genesis block");
            (tip.index + 1, tip.hash.clone())
        };
        let snapshot = self.pending.lock().clone();
        let captured = snapshot.len();

        let block = self
            .miner
            .find_valid_block(index, previous_hash, snapshot, cancel)?;

        self.commit(block.clone())?;

        // Drain only the transactions the snapshot captured; anything
        // added since sits after them in insertion order.
        let mut pending = self.pending.lock();
        let drained = captured.min(pending.len());
        pending.drain(..drained);

        Ok(block)
    }

    /// Validate a block against the current tip, persist it, and publish
    /// it in memory. Persisting first means a gateway failure needs no
    /// rollback: the in-memory chain and the durable chain never diverge.
    fn commit(&self, block: Block) -> Result<(), LedgerError> {
        let mut chain = self.chain.write();
        match chain.last() {
            Some(tip) => {
                validator::validate_link(tip, &block).map_err(LedgerError::InvalidBlock)?
            }
            None => validator::validate(std::slice::from_ref(&block))
                .map_err(LedgerError::InvalidBlock)?,
        }

        if let Err(e) = self.store.append(&block) {
            error!("failed to persist block {}: {}", block.index, e);
            return Err(e.into());
        }

        info!("committed block {} ({})", block.index, block.hash);
        chain.push(block);
        Ok(())
    }

    /// The committed chain, committed blocks only, genesis first.
    pub fn current_chain(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    /// Number of committed blocks.
    pub fn height(&self) -> u64 {
        self.chain.read().len() as u64
    }

    /// Transactions buffered for the next block, in insertion order.
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pending.lock().clone()
    }

    /// On-demand integrity audit over the committed chain. Read-only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validator::validate(&self.chain.read())
    }
}
