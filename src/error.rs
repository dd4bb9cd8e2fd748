use photo_gallery::MediaStoreError;
use std::fmt;

/// Central error type for the photo lifecycle core
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// JSON encoding or decoding of a stored value failed
    Serialization(String),
    /// Configuration file could not be read or parsed
    Config(String),
    /// The device media store reported an error
    MediaStore(MediaStoreError),
    /// Durable storage is not reachable (poisoned lock, failed worker, ...)
    StorageUnavailable(String),
    /// Resource not found
    NotFound(String),
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::MediaStore(e) => write!(f, "Media store error: {}", e),
            AppError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<MediaStoreError> for AppError {
    fn from(e: MediaStoreError) -> Self {
        AppError::MediaStore(e)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::StorageUnavailable(format!("Worker task failed: {}", e))
    }
}

/// User-friendly error messages for UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::StorageUnavailable(_) => {
                "Your changes could not be saved. They will be kept for this session.".to_string()
            }
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Serialization(_) => "Saved data could not be read.".to_string(),
            AppError::Config(msg) => format!("Invalid configuration: {}", msg),
            AppError::MediaStore(MediaStoreError::PermissionDenied(_)) => {
                "Photo library access is required. Please grant access and try again.".to_string()
            }
            AppError::MediaStore(_) => {
                "The photo library could not complete the request. Please try again.".to_string()
            }
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
