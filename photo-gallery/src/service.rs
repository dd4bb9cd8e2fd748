use crate::models::{AssetInfo, AssetPage, AssetQuery};
use async_trait::async_trait;

/// Error type for media store operations
#[derive(Debug)]
pub enum MediaStoreError {
    PermissionDenied(String),
    NotFound(String),
    IoError(std::io::Error),
    ImageError(String),
    Other(String),
}

impl std::fmt::Display for MediaStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaStoreError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            MediaStoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            MediaStoreError::IoError(e) => write!(f, "IO error: {}", e),
            MediaStoreError::ImageError(msg) => write!(f, "Image error: {}", msg),
            MediaStoreError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MediaStoreError {}

impl From<std::io::Error> for MediaStoreError {
    fn from(err: std::io::Error) -> Self {
        MediaStoreError::IoError(err)
    }
}

impl From<image::ImageError> for MediaStoreError {
    fn from(err: image::ImageError) -> Self {
        MediaStoreError::ImageError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MediaStoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        MediaStoreError::Other(format!("Task join error: {}", err))
    }
}

/// The device gallery: the authoritative store of photos and videos.
///
/// Every call may fail. `delete_assets` may also report a partial failure by
/// returning `Ok(false)`; callers treat that the same as an `Err`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Whether access to the library is currently granted
    async fn check_permission(&self) -> Result<bool, MediaStoreError>;

    /// Asks for library access; returns the resulting grant
    async fn request_permission(&self) -> Result<bool, MediaStoreError>;

    /// Lists one page of assets
    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, MediaStoreError>;

    /// Metadata for one asset, `None` when the asset no longer exists or cannot be read
    async fn get_asset_info(&self, id: &str) -> Result<Option<AssetInfo>, MediaStoreError>;

    /// Deletes the given assets from the device
    async fn delete_assets(&self, ids: &[String]) -> Result<bool, MediaStoreError>;
}

/// Checks for library access and asks for it when missing.
///
/// Errors are logged and reported as "not granted".
pub async fn ensure_permission(media: &dyn MediaStore) -> bool {
    match media.check_permission().await {
        Ok(true) => return true,
        Ok(false) => log::debug!("Media library permission missing, requesting"),
        Err(e) => log::warn!("Permission check failed: {}", e),
    }

    match media.request_permission().await {
        Ok(granted) => {
            if !granted {
                log::warn!("Media library permission denied");
            }
            granted
        }
        Err(e) => {
            log::error!("Permission request failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryMediaStore;

    #[tokio::test]
    async fn test_ensure_permission_requests_when_missing() {
        let store = MemoryMediaStore::new();
        store.set_permission(false, true);

        assert!(ensure_permission(&store).await);
        assert!(store.check_permission().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_permission_denied() {
        let store = MemoryMediaStore::new();
        store.set_permission(false, false);

        assert!(!ensure_permission(&store).await);
    }

    #[test]
    fn test_error_display() {
        let err = MediaStoreError::PermissionDenied("photos".to_string());
        assert_eq!(err.to_string(), "Permission denied: photos");
    }
}
