//! SQLite storage implementation

use crate::extract::ProductRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::ProductRow;
use crate::CrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at the given path
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Links the record's size labels to a product row
    fn insert_sizes(&mut self, product_id: i64, sizes: &[String]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        for size in sizes {
            self.conn.execute(
                "INSERT OR IGNORE INTO sizes (text, created_at) VALUES (?1, ?2)",
                params![size, now],
            )?;
            self.conn.execute(
                "INSERT OR IGNORE INTO product_sizes (product_id, size_text) VALUES (?1, ?2)",
                params![product_id, size],
            )?;
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn upsert_product(&mut self, record: &ProductRecord) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let breadcrumbs = serde_json::to_string(&record.breadcrumbs)?;

        let id = if record.id > 0 {
            let existing: Option<i64> = self
                .conn
                .query_row(
                    "SELECT id FROM products WHERE id = ?1",
                    params![record.id],
                    |row| row.get(0),
                )
                .optional()?;

            // Upsert-by-id: an already present row stays as written by
            // whoever got there first.
            if let Some(id) = existing {
                return Ok(id);
            }

            self.conn.execute(
                "INSERT INTO products (id, breadcrumbs, detail, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![record.id, breadcrumbs, record.detail, record.description, now, now],
            )?;
            record.id
        } else {
            // Unknown identity: always a fresh row, id assigned by SQLite.
            self.conn.execute(
                "INSERT INTO products (breadcrumbs, detail, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![breadcrumbs, record.detail, record.description, now, now],
            )?;
            self.conn.last_insert_rowid()
        };

        self.insert_sizes(id, &record.sizes)?;

        Ok(id)
    }

    fn get_product(&self, id: i64) -> StorageResult<Option<ProductRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, breadcrumbs, detail, description, created_at, updated_at
                 FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, breadcrumbs, detail, description, created_at, updated_at)) => {
                Ok(Some(ProductRow {
                    id,
                    breadcrumbs: serde_json::from_str(&breadcrumbs)?,
                    detail,
                    description,
                    created_at,
                    updated_at,
                }))
            }
            None => Ok(None),
        }
    }

    fn product_sizes(&self, id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT size_text FROM product_sizes WHERE product_id = ?1 ORDER BY size_text",
        )?;
        let sizes = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(sizes)
    }

    fn count_products(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_sizes(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sizes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, detail: &str) -> ProductRecord {
        ProductRecord {
            id,
            breadcrumbs: vec!["Home".to_string(), format!("Product ID: {}", id)],
            sizes: vec!["S".to_string(), "M".to_string()],
            detail: detail.to_string(),
            description: "A jersey".to_string(),
        }
    }

    #[test]
    fn test_insert_with_explicit_id() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let id = storage.upsert_product(&record(42, "first")).unwrap();
        assert_eq!(id, 42);

        let row = storage.get_product(42).unwrap().unwrap();
        assert_eq!(row.detail, "first");
        assert_eq!(row.breadcrumbs, vec!["Home", "Product ID: 42"]);
    }

    #[test]
    fn test_upsert_same_id_keeps_first_row() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        storage.upsert_product(&record(42, "first")).unwrap();
        let id = storage.upsert_product(&record(42, "second")).unwrap();

        assert_eq!(id, 42);
        assert_eq!(storage.count_products().unwrap(), 1);
        let row = storage.get_product(42).unwrap().unwrap();
        assert_eq!(row.detail, "first");
    }

    #[test]
    fn test_zero_id_always_creates() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(
                storage
                    .upsert_product(&record(0, &format!("row {}", i)))
                    .unwrap(),
            );
        }

        assert_eq!(storage.count_products().unwrap(), 5);
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(ids.iter().all(|id| *id > 0));
    }

    #[test]
    fn test_sizes_linked_and_deduped() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        storage.upsert_product(&record(1, "a")).unwrap();
        storage.upsert_product(&record(0, "b")).unwrap();

        // Both products share the same two labels; the sizes table holds
        // each label once.
        assert_eq!(storage.count_sizes().unwrap(), 2);
        assert_eq!(storage.product_sizes(1).unwrap(), vec!["M", "S"]);
    }

    #[tokio::test]
    async fn test_concurrent_same_id_upserts_collapse_to_one_row() {
        use crate::dispatch::dispatch;
        use std::sync::Arc;
        use tokio::sync::Mutex;

        let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));

        // Eight writers race on the same identity through the gate.
        let writers: Vec<usize> = (0..8).collect();
        let storage_clone = Arc::clone(&storage);
        dispatch(writers, 8, move |writer| {
            let storage = Arc::clone(&storage_clone);
            async move {
                let mut storage = storage.lock().await;
                let id = storage
                    .upsert_product(&record(42, &format!("writer {}", writer)))
                    .unwrap();
                assert_eq!(id, 42);
            }
        })
        .await;

        let storage = storage.lock().await;
        assert_eq!(storage.count_products().unwrap(), 1);

        // Whoever took the lock first owns the row; the other seven
        // upserts left it untouched.
        let row = storage.get_product(42).unwrap().unwrap();
        assert!(row.detail.starts_with("writer "));
    }

    #[test]
    fn test_get_missing_product() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_product(999).unwrap().is_none());
    }

    #[test]
    fn test_empty_record_fields() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage
            .upsert_product(&ProductRecord::default())
            .unwrap();

        let row = storage.get_product(id).unwrap().unwrap();
        assert!(row.breadcrumbs.is_empty());
        assert!(row.detail.is_empty());
        assert!(storage.product_sizes(id).unwrap().is_empty());
    }
}
