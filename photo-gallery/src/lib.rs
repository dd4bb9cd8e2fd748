//! # Photo Gallery
//!
//! Access to the device photo library for swipe-to-declutter apps.
//!
//! This crate provides:
//! - The [`MediaStore`] gateway contract (permission, paginated listing,
//!   metadata lookup, batch deletion)
//! - A directory-backed store for desktop and an in-memory store for tests
//! - [`PhotoFeed`], a paginated most-recent-first feed with one page of prefetch
//! - [`PhotoAnalyzer`], a batch scan bucketing photos by orientation and
//!   grouping likely duplicates
//!
//! ## Platform Separation
//!
//! Platform photo libraries implement [`MediaStore`] in the application crate.
//! Nothing here decodes image pixels.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_gallery::{FeedConfig, LocalMediaStore, PhotoFeed};
//! use std::sync::Arc;
//!
//! let media = Arc::new(LocalMediaStore::new("/path/to/photos"));
//! let mut feed = PhotoFeed::new(media, FeedConfig::default());
//!
//! while let Some(photo) = feed.next_photo().await {
//!     println!("{}", photo.uri);
//! }
//! ```

pub mod analyzer;
pub mod feed;
pub mod local_store;
pub mod memory_store;
pub mod models;
pub mod service;

pub use analyzer::{DuplicateGroup, PhotoAnalysis, PhotoAnalyzer};
pub use feed::{fetch_page, PhotoFeed};
pub use local_store::{media_type_for, LocalMediaStore};
pub use memory_store::{DeleteBehavior, MemoryMediaStore};
pub use models::{
    AnalyzerConfig, AssetInfo, AssetPage, AssetQuery, FeedConfig, MediaType, Orientation,
    PhotoAsset, SortBy, StoredAsset,
};
pub use service::{ensure_permission, MediaStore, MediaStoreError};
