//! Durable block storage

pub mod persistence;

pub use persistence::{BlockStore, MemoryStore, SqliteStore, StorageError};
