//! Whole-library analysis: orientation buckets and size-based duplicate groups.
//!
//! Duplicates are grouped by `(width, height, size)` only. Two different
//! pictures with the same dimensions and byte size end up in the same group.

use crate::models::{AnalyzerConfig, AssetInfo, AssetQuery, MediaType, Orientation, PhotoAsset};
use crate::service::{ensure_permission, MediaStore};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

/// Assets sharing one duplicate key
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub key: String,
    pub assets: Vec<AssetInfo>,
}

/// Result of a library scan
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhotoAnalysis {
    /// Assets returned by the listing
    pub total_assets: usize,
    /// Assets whose metadata could not be read (vanished or erroring)
    pub skipped: usize,
    pub landscape: Vec<AssetInfo>,
    pub portrait: Vec<AssetInfo>,
    pub square: Vec<AssetInfo>,
    pub duplicate_groups: Vec<DuplicateGroup>,
}

impl PhotoAnalysis {
    /// Builds buckets and duplicate groups from resolved metadata
    pub fn from_infos(total_assets: usize, infos: Vec<AssetInfo>) -> Self {
        let mut analysis = PhotoAnalysis {
            total_assets,
            skipped: total_assets.saturating_sub(infos.len()),
            ..Default::default()
        };

        let mut by_key: HashMap<String, Vec<AssetInfo>> = HashMap::new();
        for info in infos {
            by_key
                .entry(info.duplicate_key())
                .or_default()
                .push(info.clone());
            match info.orientation() {
                Orientation::Landscape => analysis.landscape.push(info),
                Orientation::Portrait => analysis.portrait.push(info),
                Orientation::Square => analysis.square.push(info),
            }
        }

        let mut groups: Vec<DuplicateGroup> = by_key
            .into_iter()
            .filter(|(_, assets)| assets.len() >= 2)
            .map(|(key, assets)| DuplicateGroup { key, assets })
            .collect();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        analysis.duplicate_groups = groups;

        analysis
    }

    pub fn classified_count(&self) -> usize {
        self.landscape.len() + self.portrait.len() + self.square.len()
    }

    /// Number of assets that sit in some duplicate group
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_groups.iter().map(|g| g.assets.len()).sum()
    }
}

/// Batch scanner over a media store
pub struct PhotoAnalyzer {
    media: Arc<dyn MediaStore>,
    config: AnalyzerConfig,
}

impl PhotoAnalyzer {
    pub fn new(media: Arc<dyn MediaStore>, config: AnalyzerConfig) -> Self {
        Self { media, config }
    }

    pub async fn analyze_photos(&self) -> PhotoAnalysis {
        self.analyze_photos_with_progress(|_, _| {}).await
    }

    /// Like [`analyze_photos`](Self::analyze_photos), calling `on_progress(processed, total)`
    /// after every asset. `processed` grows by one per call and ends at `total`.
    pub async fn analyze_photos_with_progress<F>(&self, mut on_progress: F) -> PhotoAnalysis
    where
        F: FnMut(usize, usize),
    {
        let Some(assets) = self.list_all().await else {
            return PhotoAnalysis::default();
        };
        let total = assets.len();
        log::info!("Analyzing {} assets", total);

        let media = self.media.as_ref();
        let mut lookups = stream::iter(assets)
            .map(|asset| async move {
                match media.get_asset_info(&asset.id).await {
                    Ok(info) => {
                        if info.is_none() {
                            log::debug!("Asset {} vanished during analysis", asset.id);
                        }
                        info
                    }
                    Err(e) => {
                        log::warn!("Failed to read info for {}: {}", asset.id, e);
                        None
                    }
                }
            })
            .buffered(self.config.concurrency.max(1));

        let mut infos = Vec::with_capacity(total);
        let mut processed = 0;
        while let Some(info) = lookups.next().await {
            processed += 1;
            if let Some(info) = info {
                infos.push(info);
            }
            on_progress(processed, total);
        }

        let analysis = PhotoAnalysis::from_infos(total, infos);
        log::info!(
            "Analysis done: {} landscape, {} portrait, {} square, {} duplicate groups, {} skipped",
            analysis.landscape.len(),
            analysis.portrait.len(),
            analysis.square.len(),
            analysis.duplicate_groups.len(),
            analysis.skipped
        );
        analysis
    }

    /// Walks every page of the library; `None` when access is denied or listing fails
    async fn list_all(&self) -> Option<Vec<PhotoAsset>> {
        if !ensure_permission(self.media.as_ref()).await {
            return None;
        }

        let mut assets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let query = AssetQuery::recent_first(
                cursor.take(),
                self.config.page_size.max(1),
                &[MediaType::Photo],
            );
            let page = match self.media.list_assets(&query).await {
                Ok(page) => page,
                Err(e) => {
                    log::error!("Listing failed during analysis: {}", e);
                    return None;
                }
            };

            assets.extend(page.assets);
            if !page.has_next_page || page.end_cursor.is_none() {
                break;
            }
            cursor = page.end_cursor;
        }

        Some(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryMediaStore;
    use crate::models::{AssetPage, StoredAsset};
    use crate::service::MediaStoreError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    /// Removes `victim` from the library once the metadata lookups start
    struct VanishingStore {
        inner: MemoryMediaStore,
        victim: &'static str,
    }

    #[async_trait]
    impl MediaStore for VanishingStore {
        async fn check_permission(&self) -> Result<bool, MediaStoreError> {
            self.inner.check_permission().await
        }

        async fn request_permission(&self) -> Result<bool, MediaStoreError> {
            self.inner.request_permission().await
        }

        async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, MediaStoreError> {
            self.inner.list_assets(query).await
        }

        async fn get_asset_info(&self, id: &str) -> Result<Option<AssetInfo>, MediaStoreError> {
            self.inner.vanish(self.victim);
            self.inner.get_asset_info(id).await
        }

        async fn delete_assets(&self, ids: &[String]) -> Result<bool, MediaStoreError> {
            self.inner.delete_assets(ids).await
        }
    }

    fn library() -> Arc<MemoryMediaStore> {
        let now = Utc::now();
        Arc::new(MemoryMediaStore::with_assets(vec![
            StoredAsset::photo("a", 4032, 3024, 2_000_000, now),
            StoredAsset::photo("b", 4032, 3024, 2_000_000, now - Duration::minutes(1)),
            StoredAsset::photo("c", 1080, 1920, 800_000, now - Duration::minutes(2)),
            StoredAsset::photo("d", 1000, 1000, 500_000, now - Duration::minutes(3)),
        ]))
    }

    fn small_pages() -> AnalyzerConfig {
        AnalyzerConfig {
            page_size: 3,
            concurrency: 2,
        }
    }

    #[tokio::test]
    async fn test_one_duplicate_group_and_buckets() {
        let analyzer = PhotoAnalyzer::new(library(), small_pages());
        let analysis = analyzer.analyze_photos().await;

        assert_eq!(analysis.total_assets, 4);
        assert_eq!(analysis.duplicate_groups.len(), 1);
        assert_eq!(analysis.duplicate_groups[0].key, "4032x3024_2000000");
        assert_eq!(analysis.duplicate_groups[0].assets.len(), 2);
        assert_eq!(analysis.landscape.len(), 2);
        assert_eq!(analysis.portrait.len(), 1);
        assert_eq!(analysis.square.len(), 1);
        assert_eq!(analysis.classified_count(), analysis.total_assets);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_complete() {
        let analyzer = PhotoAnalyzer::new(library(), small_pages());
        let mut calls = Vec::new();
        analyzer
            .analyze_photos_with_progress(|done, total| calls.push((done, total)))
            .await;

        assert_eq!(calls, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn test_permission_denied_gives_empty_analysis() {
        let store = library();
        store.set_permission(false, false);
        let analyzer = PhotoAnalyzer::new(store, small_pages());

        assert_eq!(analyzer.analyze_photos().await, PhotoAnalysis::default());
    }

    #[test]
    fn test_vanished_assets_are_skipped() {
        let infos = vec![AssetInfo {
            id: "x".to_string(),
            uri: "file:///x.jpg".to_string(),
            width: 10,
            height: 20,
            size: 5,
            filename: "x.jpg".to_string(),
            media_subtypes: None,
        }];
        let analysis = PhotoAnalysis::from_infos(3, infos);

        assert_eq!(analysis.skipped, 2);
        assert_eq!(analysis.classified_count(), 1);
        assert!(analysis.duplicate_groups.is_empty());
    }

    #[tokio::test]
    async fn test_asset_vanishing_mid_analysis_is_skipped() {
        let now = Utc::now();
        let store = Arc::new(VanishingStore {
            inner: MemoryMediaStore::with_assets(vec![
                StoredAsset::photo("a", 4032, 3024, 2_000_000, now),
                StoredAsset::photo("b", 1080, 1920, 800_000, now - Duration::minutes(1)),
                StoredAsset::photo("c", 1000, 1000, 500_000, now - Duration::minutes(2)),
            ]),
            victim: "b",
        });
        let analyzer = PhotoAnalyzer::new(store, small_pages());

        let mut calls = Vec::new();
        let analysis = analyzer
            .analyze_photos_with_progress(|done, total| calls.push((done, total)))
            .await;

        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(analysis.total_assets, 3);
        assert_eq!(analysis.skipped, 1);
        assert_eq!(analysis.landscape.len(), 1);
        assert!(analysis.portrait.is_empty());
        assert_eq!(analysis.square.len(), 1);
    }
}
