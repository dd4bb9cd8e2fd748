//! # Decluttr
//!
//! Photo lifecycle core for a swipe-to-declutter gallery app.
//!
//! Swiping a photo away puts it in the [`RecycleBin`]; it stays on the device
//! until the user empties the bin, deletes it individually, or the retention
//! sweep purges it. Every transition is mirrored into a [`KeyValueStore`] and
//! earns experience points unless zen mode is on.
//!
//! Device access goes through the [`photo_gallery::MediaStore`] gateway.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::{AppConfig, RecycleBinConfig, DEFAULT_RETENTION_DAYS};
pub use error::AppError;
pub use models::{AudioSettings, DeletedPhoto, RecycleBinState, XpConfig};
pub use services::{RecycleBin, SettingsService};
pub use storage::{open_key_value_store, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
