//! Synchronous key-value persistence contracts.
//!
//! # Responsibility
//! - Define the string key-value contract used for durable and session state.
//! - Provide SQLite-backed (durable) and in-memory (session) implementations.
//!
//! # Invariants
//! - Keys are non-empty.
//! - `set` replaces any previous value for the same key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_kv;
pub mod sqlite_kv;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store failure.
#[derive(Debug)]
pub enum StoreError {
    EmptyKey,
    Db(DbError),
    /// A previous holder of the store lock panicked.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "store key cannot be empty"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::EmptyKey | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value store with synchronous access.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

pub(crate) fn require_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    Ok(())
}
