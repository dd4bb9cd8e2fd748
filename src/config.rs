use crate::error::AppError;
use crate::models::XpConfig;
use photo_gallery::{AnalyzerConfig, FeedConfig, MediaType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default retention before soft-deleted photos are purged
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Configuration for the recycle bin engine
#[derive(Debug, Clone, PartialEq)]
pub struct RecycleBinConfig {
    /// Photos deleted strictly longer ago than this are purged
    pub retention_days: i64,
    pub xp: XpConfig,
}

impl Default for RecycleBinConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            xp: XpConfig::default(),
        }
    }
}

/// Application configuration, read from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the key-value store
    pub database_path: PathBuf,
    /// Directory used as the photo library on desktop
    pub library_path: PathBuf,
    pub retention_days: i64,
    pub feed_page_size: usize,
    pub include_videos: bool,
    pub analyzer_page_size: usize,
    pub analyzer_concurrency: usize,
    pub xp: XpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let feed = FeedConfig::default();
        let analyzer = AnalyzerConfig::default();
        Self {
            database_path: crate::database::get_database_path(),
            library_path: PathBuf::from("./photos"),
            retention_days: DEFAULT_RETENTION_DAYS,
            feed_page_size: feed.page_size,
            include_videos: feed.media_types.contains(&MediaType::Video),
            analyzer_page_size: analyzer.page_size,
            analyzer_concurrency: analyzer.concurrency,
            xp: XpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document; missing keys take their defaults
    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Reads the file at `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Filesystem(e)),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.retention_days < 0 {
            return Err(AppError::Config(
                "retention_days must not be negative".to_string(),
            ));
        }
        if self.feed_page_size == 0 {
            return Err(AppError::Config("feed_page_size must be at least 1".to_string()));
        }
        if self.analyzer_page_size == 0 {
            return Err(AppError::Config(
                "analyzer_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn recycle_bin(&self) -> RecycleBinConfig {
        RecycleBinConfig {
            retention_days: self.retention_days,
            xp: self.xp,
        }
    }

    pub fn feed(&self) -> FeedConfig {
        let mut media_types = vec![MediaType::Photo];
        if self.include_videos {
            media_types.push(MediaType::Video);
        }
        FeedConfig {
            page_size: self.feed_page_size,
            media_types,
        }
    }

    pub fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            page_size: self.analyzer_page_size,
            concurrency: self.analyzer_concurrency.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config = AppConfig::from_toml(
            r#"
            library_path = "/tmp/gallery"
            retention_days = 7

            [xp]
            delete_photo = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.library_path, PathBuf::from("/tmp/gallery"));
        assert_eq!(config.recycle_bin().retention_days, 7);
        assert_eq!(config.xp.delete_photo, 20);
        assert_eq!(config.xp.restore_photo, 5);
        assert_eq!(config.feed_page_size, 20);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let raw = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&raw).unwrap(), config);
    }

    #[test]
    fn test_validation() {
        assert!(AppConfig::from_toml("retention_days = -1").is_err());
        assert!(AppConfig::from_toml("feed_page_size = 0").is_err());
        assert!(AppConfig::from_toml("retention_days = \"soon\"").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_feed_media_types() {
        let config = AppConfig {
            include_videos: false,
            ..AppConfig::default()
        };
        assert_eq!(config.feed().media_types, vec![MediaType::Photo]);
    }
}
