//! Storage module for persisting extracted products
//!
//! SQLite-backed persistence with upsert-by-id semantics: a record whose
//! id is already present leaves the existing row untouched, and a record
//! with id 0 always inserts a new row with a storage-assigned id. Size
//! labels live in their own table with a junction to products, mirroring
//! a many-to-many variant set.
//!
//! Writers share one backend behind a single `tokio::sync::Mutex`; write
//! volume is low relative to fetch volume, so coarse serialization is the
//! correctness guarantee against duplicate-id races.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// A product row as stored
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub breadcrumbs: Vec<String>,
    pub detail: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}
