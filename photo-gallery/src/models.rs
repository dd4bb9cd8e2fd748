use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media a gallery asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

/// Ordering of a listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    CreationTimeDesc,
    CreationTimeAsc,
}

/// A photo or video reference handed to the swipe UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAsset {
    pub id: String,
    pub uri: String,
}

/// Metadata for a single gallery asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub id: String,
    pub uri: String,
    pub width: u32,
    pub height: u32,
    /// File size in bytes
    pub size: u64,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_subtypes: Option<Vec<String>>,
}

/// Orientation bucket derived from asset dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl AssetInfo {
    pub fn orientation(&self) -> Orientation {
        use std::cmp::Ordering;

        match self.width.cmp(&self.height) {
            Ordering::Greater => Orientation::Landscape,
            Ordering::Less => Orientation::Portrait,
            Ordering::Equal => Orientation::Square,
        }
    }

    /// Grouping key for the size-based duplicate heuristic: `{width}x{height}_{size}`
    pub fn duplicate_key(&self) -> String {
        format!("{}x{}_{}", self.width, self.height, self.size)
    }
}

/// Listing request sent to a media store
#[derive(Debug, Clone, PartialEq)]
pub struct AssetQuery {
    /// Cursor returned as `end_cursor` by the previous page; `None` starts from the top
    pub after: Option<String>,
    pub first: usize,
    pub media_types: Vec<MediaType>,
    pub sort_by: SortBy,
}

impl AssetQuery {
    /// Most-recent-first query for `first` items after `after`
    pub fn recent_first(after: Option<String>, first: usize, media_types: &[MediaType]) -> Self {
        Self {
            after,
            first,
            media_types: media_types.to_vec(),
            sort_by: SortBy::CreationTimeDesc,
        }
    }
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetPage {
    pub assets: Vec<PhotoAsset>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl AssetPage {
    /// An empty page with no successor; what the feed degrades to on errors
    pub fn terminal() -> Self {
        Self::default()
    }
}

/// Record held by the in-memory media store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub info: AssetInfo,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

impl StoredAsset {
    /// A photo asset with a `file://` uri derived from its id
    pub fn photo(id: &str, width: u32, height: u32, size: u64, created_at: DateTime<Utc>) -> Self {
        let filename = format!("{}.jpg", id);
        Self {
            info: AssetInfo {
                id: id.to_string(),
                uri: format!("file:///gallery/{}", filename),
                width,
                height,
                size,
                filename,
                media_subtypes: None,
            },
            media_type: MediaType::Photo,
            created_at,
        }
    }
}

/// Configuration for the paginated photo feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub page_size: usize,
    pub media_types: Vec<MediaType>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            media_types: vec![MediaType::Photo, MediaType::Video],
        }
    }
}

/// Configuration for full-library analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Page size used while walking the whole library
    pub page_size: usize,
    /// Maximum number of metadata lookups in flight
    pub concurrency: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            concurrency: 8,
        }
    }
}
