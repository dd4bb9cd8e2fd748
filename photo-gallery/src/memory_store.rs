//! In-memory media store.
//!
//! Stands in for the device gallery in tests and demos. Failure modes of the
//! real gallery (denied permission, deletions that silently fail, assets that
//! vanish) can be switched on per instance.

use crate::models::{AssetInfo, AssetPage, AssetQuery, PhotoAsset, SortBy, StoredAsset};
use crate::service::{MediaStore, MediaStoreError};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};

/// How `delete_assets` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteBehavior {
    #[default]
    Succeed,
    /// Returns `Ok(false)` and removes nothing
    ReportFailure,
    /// Returns an error and removes nothing
    Error,
}

#[derive(Debug)]
struct Inner {
    assets: Vec<StoredAsset>,
    permission_granted: bool,
    grant_on_request: bool,
    delete_behavior: DeleteBehavior,
    fail_listing: bool,
    delete_calls: Vec<Vec<String>>,
    list_calls: usize,
}

/// Media store backed by a vector of assets
#[derive(Debug)]
pub struct MemoryMediaStore {
    inner: Mutex<Inner>,
}

/// Sort position of an asset: creation time in microseconds, then id
fn sort_position(asset: &StoredAsset) -> (i64, &str) {
    (asset.created_at.timestamp_micros(), asset.info.id.as_str())
}

/// Orders positions by creation time in the requested direction, ids ascending on ties
fn compare(sort_by: SortBy, a: (i64, &str), b: (i64, &str)) -> Ordering {
    let by_time = match sort_by {
        SortBy::CreationTimeDesc => b.0.cmp(&a.0),
        SortBy::CreationTimeAsc => a.0.cmp(&b.0),
    };
    by_time.then_with(|| a.1.cmp(b.1))
}

fn cursor_for(asset: &StoredAsset) -> String {
    let (micros, id) = sort_position(asset);
    format!("{}:{}", micros, id)
}

/// Splits a `"{micros}:{id}"` cursor
fn parse_cursor(cursor: &str) -> Result<(i64, &str), MediaStoreError> {
    cursor
        .split_once(':')
        .and_then(|(micros, id)| Some((micros.parse::<i64>().ok()?, id)))
        .ok_or_else(|| MediaStoreError::Other(format!("Malformed cursor: {}", cursor)))
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMediaStore {
    /// Empty store with permission already granted
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                assets: Vec::new(),
                permission_granted: true,
                grant_on_request: true,
                delete_behavior: DeleteBehavior::Succeed,
                fail_listing: false,
                delete_calls: Vec::new(),
                list_calls: 0,
            }),
        }
    }

    pub fn with_assets(assets: Vec<StoredAsset>) -> Self {
        let store = Self::new();
        store.inner().assets = assets;
        store
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_asset(&self, asset: StoredAsset) {
        self.inner().assets.push(asset);
    }

    /// Removes an asset behind the caller's back, as when the user deletes it in another app
    pub fn vanish(&self, id: &str) {
        self.inner().assets.retain(|a| a.info.id != id);
    }

    pub fn set_permission(&self, granted: bool, grant_on_request: bool) {
        let mut inner = self.inner();
        inner.permission_granted = granted;
        inner.grant_on_request = grant_on_request;
    }

    pub fn set_delete_behavior(&self, behavior: DeleteBehavior) {
        self.inner().delete_behavior = behavior;
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.inner().fail_listing = fail;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner().assets.iter().any(|a| a.info.id == id)
    }

    pub fn asset_count(&self) -> usize {
        self.inner().assets.len()
    }

    /// Every id batch passed to `delete_assets`, in call order
    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.inner().delete_calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.inner().list_calls
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn check_permission(&self) -> Result<bool, MediaStoreError> {
        Ok(self.inner().permission_granted)
    }

    async fn request_permission(&self) -> Result<bool, MediaStoreError> {
        let mut inner = self.inner();
        if inner.grant_on_request {
            inner.permission_granted = true;
        }
        Ok(inner.permission_granted)
    }

    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, MediaStoreError> {
        let mut inner = self.inner();
        inner.list_calls += 1;

        if inner.fail_listing {
            return Err(MediaStoreError::Other("Listing failed".to_string()));
        }
        if !inner.permission_granted {
            return Err(MediaStoreError::PermissionDenied(
                "media library".to_string(),
            ));
        }

        let mut matching: Vec<&StoredAsset> = inner
            .assets
            .iter()
            .filter(|a| query.media_types.contains(&a.media_type))
            .collect();
        matching.sort_by(|a, b| compare(query.sort_by, sort_position(a), sort_position(b)));

        // Resume by sort position, so the cursor asset itself may have vanished
        let start = match &query.after {
            None => 0,
            Some(cursor) => {
                let after = parse_cursor(cursor)?;
                matching
                    .iter()
                    .position(|a| {
                        compare(query.sort_by, sort_position(a), after) == Ordering::Greater
                    })
                    .unwrap_or(matching.len())
            }
        };

        let page: Vec<_> = matching.iter().skip(start).take(query.first).collect();
        let end = start + page.len();

        Ok(AssetPage {
            assets: page
                .iter()
                .map(|a| PhotoAsset {
                    id: a.info.id.clone(),
                    uri: a.info.uri.clone(),
                })
                .collect(),
            has_next_page: end < matching.len(),
            end_cursor: page.last().map(|a| cursor_for(a)),
        })
    }

    async fn get_asset_info(&self, id: &str) -> Result<Option<AssetInfo>, MediaStoreError> {
        Ok(self
            .inner()
            .assets
            .iter()
            .find(|a| a.info.id == id)
            .map(|a| a.info.clone()))
    }

    async fn delete_assets(&self, ids: &[String]) -> Result<bool, MediaStoreError> {
        let mut inner = self.inner();
        inner.delete_calls.push(ids.to_vec());

        match inner.delete_behavior {
            DeleteBehavior::Succeed => {
                inner.assets.retain(|a| !ids.contains(&a.info.id));
                Ok(true)
            }
            DeleteBehavior::ReportFailure => Ok(false),
            DeleteBehavior::Error => Err(MediaStoreError::Other(
                "Deletion rejected by media store".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::{Duration, Utc};

    fn store_with(n: usize) -> MemoryMediaStore {
        let now = Utc::now();
        MemoryMediaStore::with_assets(
            (0..n)
                .map(|i| {
                    StoredAsset::photo(
                        &format!("p{}", i),
                        100,
                        100,
                        1000,
                        now - Duration::minutes(i as i64),
                    )
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_listing_is_most_recent_first() {
        let store = store_with(3);
        let page = store
            .list_assets(&AssetQuery::recent_first(None, 10, &[MediaType::Photo]))
            .await
            .unwrap();

        let ids: Vec<_> = page.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2"]);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_media_type_filter() {
        let store = store_with(2);
        let page = store
            .list_assets(&AssetQuery::recent_first(None, 10, &[MediaType::Video]))
            .await
            .unwrap();
        assert!(page.assets.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_assets() {
        let store = store_with(2);
        store.set_delete_behavior(DeleteBehavior::ReportFailure);

        let ok = store.delete_assets(&["p0".to_string()]).await.unwrap();
        assert!(!ok);
        assert!(store.contains("p0"));
        assert_eq!(store.delete_calls(), vec![vec!["p0".to_string()]]);
    }

    #[tokio::test]
    async fn test_vanished_asset_has_no_info() {
        let store = store_with(1);
        store.vanish("p0");
        assert_eq!(store.get_asset_info("p0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cursor_survives_vanished_asset() {
        let store = store_with(4);
        let types = [MediaType::Photo];
        let first = store
            .list_assets(&AssetQuery::recent_first(None, 2, &types))
            .await
            .unwrap();
        store.vanish("p1");

        let second = store
            .list_assets(&AssetQuery::recent_first(first.end_cursor, 2, &types))
            .await
            .unwrap();
        let ids: Vec<_> = second.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3"]);
        assert!(!second.has_next_page);
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_an_error() {
        let store = store_with(2);
        let query = AssetQuery::recent_first(Some("p0".to_string()), 2, &[MediaType::Photo]);
        assert!(store.list_assets(&query).await.is_err());
    }
}
