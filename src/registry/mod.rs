//! Symbol registry module
//!
//! Durable store of tracked symbols and their last known quote. The registry
//! is the single source of truth for the tracked set; nothing else keeps a
//! copy of it.

mod sqlite;
mod types;

pub use sqlite::SqliteRegistry;
pub use types::{
    normalize_symbol, RecordUpdate, StorageError, TrackedSymbol, ValidationError, MAX_SYMBOL_LEN,
};

use crate::quote::QuoteSnapshot;
use async_trait::async_trait;

/// Trait for tracked-symbol stores
///
/// Every operation is atomic per symbol: concurrent readers never observe a
/// half-applied update.
#[async_trait]
pub trait SymbolRegistry: Send + Sync {
    /// Create the record if absent, otherwise overwrite only the fields
    /// present in `snapshot`
    async fn upsert(
        &self,
        symbol: &str,
        snapshot: &QuoteSnapshot,
    ) -> Result<TrackedSymbol, StorageError>;

    /// Like `upsert`, but never creates: `Ok(None)` when the symbol is not
    /// tracked (e.g. removed while a refresh was in flight)
    ///
    /// The returned prior price is read in the same atomic step as the write.
    async fn update_existing(
        &self,
        symbol: &str,
        snapshot: &QuoteSnapshot,
    ) -> Result<Option<RecordUpdate>, StorageError>;

    /// Remove by identifier; `Ok(false)` when no such record exists
    async fn remove(&self, id: i64) -> Result<bool, StorageError>;

    /// All records in insertion order
    async fn list_all(&self) -> Result<Vec<TrackedSymbol>, StorageError>;

    async fn get(&self, symbol: &str) -> Result<Option<TrackedSymbol>, StorageError>;

    /// Cheap connectivity check used by health checks
    async fn ping(&self) -> Result<(), StorageError>;
}
