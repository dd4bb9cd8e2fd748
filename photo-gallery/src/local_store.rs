//! Directory-backed media store.
//!
//! Treats one directory as the device gallery. Used by the headless binary on
//! desktop, where there is no platform photo library to talk to.

use crate::models::{AssetInfo, AssetPage, AssetQuery, MediaType, PhotoAsset, SortBy};
use crate::service::{MediaStore, MediaStoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "webm"];

/// Classifies a path by extension, `None` for unsupported files
pub fn media_type_for(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Photo)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
struct Entry {
    file_name: String,
    created_ms: u128,
    media_type: MediaType,
}

impl Entry {
    fn cursor(&self) -> String {
        format!("{}:{}", self.created_ms, self.file_name)
    }

    fn sort_key(&self) -> (u128, &str) {
        (self.created_ms, self.file_name.as_str())
    }
}

/// Splits a `"{millis}:{file_name}"` cursor
fn parse_cursor(cursor: &str) -> Result<(u128, &str), MediaStoreError> {
    let (millis, name) = cursor
        .split_once(':')
        .ok_or_else(|| MediaStoreError::Other(format!("Malformed cursor: {}", cursor)))?;
    let millis = millis
        .parse::<u128>()
        .map_err(|_| MediaStoreError::Other(format!("Malformed cursor: {}", cursor)))?;
    Ok((millis, name))
}

fn created_millis(metadata: &std::fs::Metadata) -> u128 {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Media store over the files of a single directory (not recursive)
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn uri_for(root: &Path, file_name: &str) -> String {
        format!("file://{}", root.join(file_name).display())
    }

    /// Resolves an asset id to a file inside the root, rejecting path traversal
    fn path_for(root: &Path, id: &str) -> Result<PathBuf, MediaStoreError> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            return Err(MediaStoreError::NotFound(format!("Invalid asset id: {}", id)));
        }
        Ok(root.join(id))
    }

    fn scan(root: &Path) -> Result<Vec<Entry>, MediaStoreError> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(media_type) = media_type_for(&path) else {
                continue;
            };
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::debug!("Skipping non UTF-8 file name: {:?}", path);
                continue;
            };

            let metadata = entry.metadata()?;
            entries.push(Entry {
                file_name: file_name.to_string(),
                created_ms: created_millis(&metadata),
                media_type,
            });
        }

        Ok(entries)
    }

    fn list_blocking(root: &Path, query: &AssetQuery) -> Result<AssetPage, MediaStoreError> {
        let mut entries: Vec<Entry> = Self::scan(root)?
            .into_iter()
            .filter(|e| query.media_types.contains(&e.media_type))
            .collect();

        match query.sort_by {
            SortBy::CreationTimeDesc => entries.sort_by(|a, b| b.sort_key().cmp(&a.sort_key())),
            SortBy::CreationTimeAsc => entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key())),
        }

        // Resume strictly after the cursor position so files removed in the
        // meantime do not shift the remaining pages.
        let start = match &query.after {
            None => 0,
            Some(cursor) => {
                let (millis, name) = parse_cursor(cursor)?;
                let key = (millis, name);
                entries
                    .iter()
                    .position(|e| match query.sort_by {
                        SortBy::CreationTimeDesc => e.sort_key() < key,
                        SortBy::CreationTimeAsc => e.sort_key() > key,
                    })
                    .unwrap_or(entries.len())
            }
        };

        let page: Vec<&Entry> = entries.iter().skip(start).take(query.first).collect();
        let end = start + page.len();

        Ok(AssetPage {
            assets: page
                .iter()
                .map(|e| PhotoAsset {
                    id: e.file_name.clone(),
                    uri: Self::uri_for(root, &e.file_name),
                })
                .collect(),
            has_next_page: end < entries.len(),
            end_cursor: page.last().map(|e| e.cursor()),
        })
    }

    fn info_blocking(root: &Path, id: &str) -> Result<Option<AssetInfo>, MediaStoreError> {
        let path = Self::path_for(root, id)?;
        if !path.is_file() {
            return Ok(None);
        }

        let metadata = std::fs::metadata(&path)?;
        let (width, height) = match media_type_for(&path) {
            // Header read only, the pixels are never decoded
            Some(MediaType::Photo) => match image::image_dimensions(&path) {
                Ok(dims) => dims,
                Err(e) => {
                    // Without dimensions the photo cannot be classified
                    log::warn!("Could not read dimensions of {}: {}", path.display(), e);
                    return Ok(None);
                }
            },
            _ => (0, 0),
        };

        Ok(Some(AssetInfo {
            id: id.to_string(),
            uri: Self::uri_for(root, id),
            width,
            height,
            size: metadata.len(),
            filename: id.to_string(),
            media_subtypes: None,
        }))
    }

    fn delete_blocking(root: &Path, ids: &[String]) -> Result<bool, MediaStoreError> {
        let mut all_removed = true;

        for id in ids {
            let path = Self::path_for(root, id)?;
            match std::fs::remove_file(&path) {
                Ok(()) => log::debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("Already gone: {}", path.display());
                }
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    all_removed = false;
                }
            }
        }

        Ok(all_removed)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn check_permission(&self) -> Result<bool, MediaStoreError> {
        let root = self.root.clone();
        Ok(tokio::task::spawn_blocking(move || std::fs::read_dir(root).is_ok()).await?)
    }

    async fn request_permission(&self) -> Result<bool, MediaStoreError> {
        // There is no prompt on desktop, access is whatever the filesystem grants
        self.check_permission().await
    }

    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, MediaStoreError> {
        let root = self.root.clone();
        let query = query.clone();
        tokio::task::spawn_blocking(move || Self::list_blocking(&root, &query)).await?
    }

    async fn get_asset_info(&self, id: &str) -> Result<Option<AssetInfo>, MediaStoreError> {
        let root = self.root.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || Self::info_blocking(&root, &id)).await?
    }

    async fn delete_assets(&self, ids: &[String]) -> Result<bool, MediaStoreError> {
        let root = self.root.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || Self::delete_blocking(&root, &ids)).await?
    }
}
