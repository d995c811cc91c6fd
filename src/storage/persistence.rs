//! Block persistence layer
//!
//! The ledger treats storage as an append-only log of blocks: load them
//! all in index order at startup, append one at a time afterwards. Stored
//! rows are never mutated, reordered or deleted.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::io;
use std::path::Path;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Abstract durable store for committed blocks.
///
/// `load_all` returns blocks in ascending index order; `append` adds one
/// block at the tail. Implementations must preserve insertion order and
/// never rewrite previously appended rows.
pub trait BlockStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<Block>, StorageError>;
    fn append(&self, block: &Block) -> Result<(), StorageError>;
}

/// SQLite-backed block store.
///
/// One row per block; transactions are stored as JSON text and the
/// timestamp as an RFC 3339 string with full nanosecond precision, so a
/// reloaded block re-serializes to the exact canonical bytes that produced
/// its hash.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database; useful for ephemeral runs.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        // `index` is a SQLite keyword, hence `block_index`.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS blocks (
                block_index INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                transactions TEXT NOT NULL,
                previous_hash TEXT NOT NULL,
                nonce INTEGER NOT NULL,
                hash TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_block(
        index: i64,
        timestamp: String,
        transactions_json: String,
        previous_hash: String,
        nonce: i64,
        hash: String,
    ) -> Result<Block, StorageError> {
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| StorageError::InvalidData(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);
        let transactions: Vec<Transaction> = serde_json::from_str(&transactions_json)?;
        Ok(Block {
            index: index as u64,
            timestamp,
            transactions,
            previous_hash,
            nonce: nonce as u64,
            hash,
        })
    }
}

impl BlockStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<Block>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT block_index, timestamp, transactions, previous_hash, nonce, hash
             FROM blocks ORDER BY block_index ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut blocks = Vec::new();
        for row in rows {
            let (index, timestamp, transactions, previous_hash, nonce, hash) = row?;
            blocks.push(Self::row_to_block(
                index,
                timestamp,
                transactions,
                previous_hash,
                nonce,
                hash,
            )?);
        }
        Ok(blocks)
    }

    fn append(&self, block: &Block) -> Result<(), StorageError> {
        let transactions_json = serde_json::to_string(&block.transactions)?;
        let conn = self.conn.lock();
        // Plain INSERT: a duplicate index is a constraint violation, never
        // an overwrite.
        conn.execute(
            "INSERT INTO blocks (block_index, timestamp, transactions, previous_hash, nonce, hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                block.index as i64,
                block.timestamp.to_rfc3339(),
                transactions_json,
                block.previous_hash,
                block.nonce as i64,
                block.hash,
            ],
        )?;
        Ok(())
    }
}

/// In-memory block store for tests and ephemeral ledgers
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: Mutex<Vec<Block>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Block>, StorageError> {
        Ok(self.blocks.lock().clone())
    }

    fn append(&self, block: &Block) -> Result<(), StorageError> {
        self.blocks.lock().push(block.clone());
        Ok(())
    }
}
