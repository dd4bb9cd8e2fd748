//! Durable key-value storage.
//!
//! The recycle bin mirrors its state into string values under fixed keys.
//! Stores are async and may fail; there are no multi-key transactions.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Experience points, decimal integer string
pub const XP_KEY: &str = "@decluttr_xp";
/// Recycle bin contents, JSON array of stored deleted photos
pub const DELETED_PHOTOS_KEY: &str = "@decluttr_deleted_photos";
/// Lifetime soft-delete counter, decimal integer string
pub const TOTAL_DELETED_KEY: &str = "@decluttr_total_deleted";
/// `"true"` / `"false"`
pub const ONBOARDING_COMPLETED_KEY: &str = "@decluttr_onboarding_completed";
/// `"true"` / `"false"`
pub const ZEN_MODE_KEY: &str = "@decluttr_zen_mode";
/// `"true"` / `"false"`
pub const NAVIGATION_MODE_KEY: &str = "@decluttr_navigation_mode";
/// JSON `{ "enabled": bool, "volume": number }`
pub const AUDIO_SETTINGS_KEY: &str = "decluttr_audio_settings";

/// Async string store keyed by string
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Loads and deserializes a JSON value stored under `key`
pub async fn load_json_with<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Serializes `value` as JSON and stores it under `key`
pub async fn save_json_with<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Opens the SQLite store at `db_path`, falling back to memory when that fails.
///
/// With the memory fallback nothing survives a restart, but the app keeps working.
pub fn open_key_value_store(db_path: &Path) -> Arc<dyn KeyValueStore> {
    match SqliteKeyValueStore::open(db_path) {
        Ok(store) => {
            log::info!("Using SQLite key-value store at {}", db_path.display());
            Arc::new(store)
        }
        Err(e) => {
            log::warn!(
                "Could not open key-value store at {} ({}), falling back to memory",
                db_path.display(),
                e
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioSettings;

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let store = MemoryKeyValueStore::new();
        let settings = AudioSettings {
            enabled: false,
            volume: 0.25,
        };

        save_json_with(&store, AUDIO_SETTINGS_KEY, &settings)
            .await
            .unwrap();
        let loaded: Option<AudioSettings> =
            load_json_with(&store, AUDIO_SETTINGS_KEY).await.unwrap();
        assert_eq!(loaded, Some(settings));

        let missing: Option<AudioSettings> = load_json_with(&store, "absent").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_open_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        let store = open_key_value_store(dir.path());

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
