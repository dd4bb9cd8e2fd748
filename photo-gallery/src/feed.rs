//! Paginated photo feed for the swipe UI.
//!
//! Pages are pulled most-recent-first. As soon as a page arrives and the
//! store reports more, the next page is fetched in the background so the UI
//! does not stall when the visible page runs out.

use crate::models::{AssetPage, AssetQuery, FeedConfig, MediaType, PhotoAsset};
use crate::service::{ensure_permission, MediaStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Fetches one page of candidate photos.
///
/// Checks (and if needed requests) library permission first. Any failure
/// yields an empty terminal page instead of an error.
pub async fn fetch_page(
    media: &dyn MediaStore,
    cursor: Option<&str>,
    page_size: usize,
    media_types: &[MediaType],
) -> AssetPage {
    if !ensure_permission(media).await {
        return AssetPage::terminal();
    }

    let query = AssetQuery::recent_first(cursor.map(str::to_string), page_size, media_types);
    match media.list_assets(&query).await {
        Ok(page) => {
            log::debug!(
                "Fetched {} assets after {:?} (has_next_page={})",
                page.assets.len(),
                cursor,
                page.has_next_page
            );
            page
        }
        Err(e) => {
            log::error!("Failed to fetch photo page after {:?}: {}", cursor, e);
            AssetPage::terminal()
        }
    }
}

/// Photo supplier with a one-page-ahead prefetch buffer
pub struct PhotoFeed {
    media: Arc<dyn MediaStore>,
    config: FeedConfig,
    visible: VecDeque<PhotoAsset>,
    /// End cursor of the visible page
    current_cursor: Option<String>,
    has_next_page: bool,
    /// Cursor the in-flight prefetch was started with
    prefetch_cursor: Option<String>,
    prefetch: Option<JoinHandle<AssetPage>>,
    loaded: bool,
}

impl PhotoFeed {
    pub fn new(media: Arc<dyn MediaStore>, config: FeedConfig) -> Self {
        Self {
            media,
            config,
            visible: VecDeque::new(),
            current_cursor: None,
            has_next_page: false,
            prefetch_cursor: None,
            prefetch: None,
            loaded: false,
        }
    }

    /// Loads the first page, replacing whatever was visible
    pub async fn load_initial(&mut self) -> usize {
        self.reset();
        let page = fetch_page(
            self.media.as_ref(),
            None,
            self.config.page_size,
            &self.config.media_types,
        )
        .await;
        self.install(page);
        self.visible.len()
    }

    /// Next photo for the swipe deck; `None` once the library is exhausted
    pub async fn next_photo(&mut self) -> Option<PhotoAsset> {
        if !self.loaded {
            self.load_initial().await;
        }
        while self.visible.is_empty() && self.has_next_page {
            self.advance().await;
        }
        self.visible.pop_front()
    }

    pub fn peek(&self) -> Option<&PhotoAsset> {
        self.visible.front()
    }

    /// Photos left in the visible page
    pub fn remaining(&self) -> usize {
        self.visible.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.loaded && self.visible.is_empty() && !self.has_next_page
    }

    pub fn is_prefetch_ready(&self) -> bool {
        self.prefetch.as_ref().is_some_and(|h| h.is_finished())
    }

    pub fn current_cursor(&self) -> Option<&str> {
        self.current_cursor.as_deref()
    }

    pub fn prefetch_cursor(&self) -> Option<&str> {
        self.prefetch_cursor.as_deref()
    }

    /// Forgets every page and cursor; the next request starts from the top.
    ///
    /// An in-flight prefetch is detached and its result discarded.
    pub fn reset(&mut self) {
        if self.prefetch.take().is_some() {
            log::debug!("Discarding in-flight prefetch");
        }
        self.visible.clear();
        self.current_cursor = None;
        self.prefetch_cursor = None;
        self.has_next_page = false;
        self.loaded = false;
    }

    /// Swaps the prefetched page in, or fetches directly when nothing is buffered
    async fn advance(&mut self) {
        let page = match self.prefetch.take() {
            Some(handle) => match handle.await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Prefetch task failed, fetching directly: {}", e);
                    self.fetch_direct().await
                }
            },
            None => self.fetch_direct().await,
        };
        self.install(page);
    }

    async fn fetch_direct(&self) -> AssetPage {
        fetch_page(
            self.media.as_ref(),
            self.current_cursor.as_deref(),
            self.config.page_size,
            &self.config.media_types,
        )
        .await
    }

    fn install(&mut self, page: AssetPage) {
        self.loaded = true;
        self.visible = page.assets.into();
        self.has_next_page = page.has_next_page;
        let stalled = page.end_cursor.is_none() || page.end_cursor == self.current_cursor;
        if self.has_next_page && self.visible.is_empty() && stalled {
            log::warn!("Media store reported more pages without advancing the cursor, stopping feed");
            self.has_next_page = false;
        }
        if page.end_cursor.is_some() {
            self.current_cursor = page.end_cursor;
        }
        self.prefetch_cursor = None;

        if self.has_next_page {
            self.start_prefetch();
        }
    }

    fn start_prefetch(&mut self) {
        let media = Arc::clone(&self.media);
        let cursor = self.current_cursor.clone();
        let page_size = self.config.page_size;
        let media_types = self.config.media_types.clone();

        self.prefetch_cursor = cursor.clone();
        self.prefetch = Some(tokio::spawn(async move {
            fetch_page(media.as_ref(), cursor.as_deref(), page_size, &media_types).await
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryMediaStore;
    use crate::models::{AssetInfo, StoredAsset};
    use crate::service::MediaStoreError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns one photo, then empty pages that claim more while the cursor never moves
    #[derive(Default)]
    struct StalledStore {
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl MediaStore for StalledStore {
        async fn check_permission(&self) -> Result<bool, MediaStoreError> {
            Ok(true)
        }

        async fn request_permission(&self) -> Result<bool, MediaStoreError> {
            Ok(true)
        }

        async fn list_assets(&self, _query: &AssetQuery) -> Result<AssetPage, MediaStoreError> {
            let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
            let assets = if call == 0 {
                vec![PhotoAsset {
                    id: "only".to_string(),
                    uri: "file:///gallery/only.jpg".to_string(),
                }]
            } else {
                Vec::new()
            };
            Ok(AssetPage {
                assets,
                has_next_page: true,
                end_cursor: Some("stuck".to_string()),
            })
        }

        async fn get_asset_info(&self, _id: &str) -> Result<Option<AssetInfo>, MediaStoreError> {
            Ok(None)
        }

        async fn delete_assets(&self, _ids: &[String]) -> Result<bool, MediaStoreError> {
            Ok(false)
        }
    }

    fn store_with(n: usize) -> Arc<MemoryMediaStore> {
        let now = Utc::now();
        Arc::new(MemoryMediaStore::with_assets(
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
        ))
    }

    fn config(page_size: usize) -> FeedConfig {
        FeedConfig {
            page_size,
            ..FeedConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_page_size_and_cursor() {
        let store = store_with(5);
        let types = [MediaType::Photo];

        let first = fetch_page(store.as_ref(), None, 2, &types).await;
        assert_eq!(first.assets.len(), 2);
        assert!(first.has_next_page);

        let second = fetch_page(store.as_ref(), first.end_cursor.as_deref(), 2, &types).await;
        let first_ids: HashSet<_> = first.assets.iter().map(|a| &a.id).collect();
        assert!(second.assets.iter().all(|a| !first_ids.contains(&a.id)));
    }

    #[tokio::test]
    async fn test_fetch_page_permission_denied_is_terminal() {
        let store = store_with(3);
        store.set_permission(false, false);

        let page = fetch_page(store.as_ref(), None, 2, &[MediaType::Photo]).await;
        assert_eq!(page, AssetPage::terminal());
    }

    #[tokio::test]
    async fn test_fetch_page_error_is_terminal() {
        let store = store_with(3);
        store.set_fail_listing(true);

        let page = fetch_page(store.as_ref(), None, 2, &[MediaType::Photo]).await;
        assert_eq!(page, AssetPage::terminal());
    }

    #[tokio::test]
    async fn test_feed_streams_whole_library_in_order() {
        let store = store_with(5);
        let mut feed = PhotoFeed::new(store.clone(), config(2));

        let mut ids = Vec::new();
        while let Some(photo) = feed.next_photo().await {
            ids.push(photo.id);
        }

        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4"]);
        assert!(feed.is_exhausted());
    }

    #[tokio::test]
    async fn test_prefetch_started_after_load() {
        let store = store_with(5);
        let mut feed = PhotoFeed::new(store.clone(), config(2));

        assert_eq!(feed.load_initial().await, 2);
        assert!(feed.prefetch_cursor().is_some_and(|c| c.ends_with(":p1")));

        // Drain the visible page; the next photo comes from the prefetched page
        feed.next_photo().await;
        feed.next_photo().await;
        assert_eq!(feed.next_photo().await.map(|p| p.id), Some("p2".to_string()));
        assert!(feed.current_cursor().is_some_and(|c| c.ends_with(":p3")));
    }

    #[tokio::test]
    async fn test_no_prefetch_on_last_page() {
        let store = store_with(2);
        let mut feed = PhotoFeed::new(store.clone(), config(5));

        feed.load_initial().await;
        assert_eq!(feed.prefetch_cursor(), None);
        assert!(!feed.is_prefetch_ready());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_reset_restarts_from_beginning() {
        let store = store_with(4);
        let mut feed = PhotoFeed::new(store.clone(), config(2));

        feed.next_photo().await;
        feed.next_photo().await;
        feed.next_photo().await;
        feed.reset();
        assert_eq!(feed.current_cursor(), None);

        assert_eq!(feed.next_photo().await.map(|p| p.id), Some("p0".to_string()));
    }

    #[tokio::test]
    async fn test_empty_library() {
        let store = store_with(0);
        let mut feed = PhotoFeed::new(store, config(2));

        assert_eq!(feed.next_photo().await, None);
        assert!(feed.is_exhausted());
    }

    #[tokio::test]
    async fn test_vanished_cursor_asset_does_not_end_feed() {
        let store = store_with(6);
        let mut feed = PhotoFeed::new(store.clone(), config(2));

        feed.load_initial().await;
        store.vanish("p1");

        let mut ids = Vec::new();
        while let Some(photo) = feed.next_photo().await {
            ids.push(photo.id);
        }
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4", "p5"]);
        assert!(feed.is_exhausted());
    }

    #[tokio::test]
    async fn test_stalled_cursor_ends_feed() {
        let store = Arc::new(StalledStore::default());
        let mut feed = PhotoFeed::new(store.clone(), config(2));

        assert_eq!(feed.next_photo().await.map(|p| p.id), Some("only".to_string()));
        assert_eq!(feed.next_photo().await, None);
        assert!(feed.is_exhausted());
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
    }
}
