use super::KeyValueStore;
use crate::database;
use crate::error::AppError;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Key-value store persisted in a SQLite table.
///
/// Queries run on the blocking pool so callers on the async runtime never
/// wait on disk I/O directly.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        let conn = database::init_database(db_path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = database::init_memory_database()?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps a connection whose schema is already initialised
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| {
                AppError::StorageUnavailable("database connection lock poisoned".to_string())
            })?;
            f(&guard)
        })
        .await?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM key_value_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO key_value_store (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM key_value_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();

        store.set("@decluttr_xp", "10").await.unwrap();
        store.set("@decluttr_xp", "15").await.unwrap();
        assert_eq!(
            store.get("@decluttr_xp").await.unwrap(),
            Some("15".to_string())
        );

        store.remove("@decluttr_xp").await.unwrap();
        assert_eq!(store.get("@decluttr_xp").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let store = SqliteKeyValueStore::open(&path).unwrap();
            store.set("k", "persisted").await.unwrap();
        }

        let store = SqliteKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("persisted".to_string()));
    }
}
