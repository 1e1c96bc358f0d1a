//! Storage trait and error types

use crate::extract::ProductRecord;
use crate::storage::ProductRow;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Callers are expected to serialize access externally; implementations
/// take `&mut self` and perform no locking of their own.
pub trait Storage {
    /// Persists a product with upsert-by-id semantics
    ///
    /// A record with a positive id inserts only if that id is absent; an
    /// existing row is left untouched. A record with id 0 always inserts
    /// a new row. Returns the id of the row the record landed on (or was
    /// ignored in favor of).
    fn upsert_product(&mut self, record: &ProductRecord) -> StorageResult<i64>;

    /// Gets a product row by id
    fn get_product(&self, id: i64) -> StorageResult<Option<ProductRow>>;

    /// Gets the size labels linked to a product, sorted
    fn product_sizes(&self, id: i64) -> StorageResult<Vec<String>>;

    /// Total number of product rows
    fn count_products(&self) -> StorageResult<u64>;

    /// Total number of distinct size labels
    fn count_sizes(&self) -> StorageResult<u64>;
}
