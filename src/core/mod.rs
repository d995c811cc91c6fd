//! Core ledger components
//!
//! The fundamental building blocks:
//! - Transactions (immutable transfer records)
//! - Blocks (canonical content serialization and hashing)
//! - Chain validation (linkage, indexes, recomputed hashes)
//! - The ledger itself (pending buffer, mining orchestration, commits)

pub mod block;
pub mod ledger;
pub mod transaction;
pub mod validator;

pub use block::{Block, GENESIS_INDEX, GENESIS_PREVIOUS_HASH};
pub use ledger::{Ledger, LedgerError};
pub use transaction::Transaction;
pub use validator::{validate, validate_link, ValidationError};
