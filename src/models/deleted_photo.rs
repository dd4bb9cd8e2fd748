use crate::error::AppError;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A photo sitting in the recycle bin. It still exists on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedPhoto {
    /// Media store asset id
    pub id: String,
    pub image_uri: String,
    pub deleted_at: DateTime<Utc>,
    /// Position the photo had in the swipe deck
    pub original_index: Option<i64>,
}

impl DeletedPhoto {
    /// Soft-deleted now
    pub fn new(id: impl Into<String>, image_uri: impl Into<String>) -> Self {
        Self::new_at(id, image_uri, Utc::now())
    }

    /// Soft-deleted at `deleted_at`, kept to millisecond precision like the stored form
    pub fn new_at(
        id: impl Into<String>,
        image_uri: impl Into<String>,
        deleted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            image_uri: image_uri.into(),
            deleted_at: deleted_at.trunc_subsecs(3),
            original_index: None,
        }
    }

    pub fn with_original_index(mut self, index: i64) -> Self {
        self.original_index = Some(index);
        self
    }

    /// True once strictly more than `retention_days` have passed since deletion
    pub fn is_expired_at(&self, now: DateTime<Utc>, retention_days: i64) -> bool {
        now - self.deleted_at > Duration::days(retention_days)
    }

    /// Whole days left before the purge picks this photo up, rounded up, never negative
    pub fn days_until_expiry(&self, now: DateTime<Utc>, retention_days: i64) -> i64 {
        let remaining = self.deleted_at + Duration::days(retention_days) - now;
        if remaining <= Duration::zero() {
            return 0;
        }
        let secs = remaining.num_seconds();
        (secs + 86_399) / 86_400
    }
}

/// On-disk shape of a [`DeletedPhoto`]: camelCase keys, `deletedAt` as an ISO 8601 string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDeletedPhoto {
    pub id: String,
    pub image_uri: String,
    pub deleted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_index: Option<i64>,
}

impl From<&DeletedPhoto> for StoredDeletedPhoto {
    fn from(photo: &DeletedPhoto) -> Self {
        Self {
            id: photo.id.clone(),
            image_uri: photo.image_uri.clone(),
            deleted_at: photo
                .deleted_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            original_index: photo.original_index,
        }
    }
}

impl TryFrom<StoredDeletedPhoto> for DeletedPhoto {
    type Error = AppError;

    fn try_from(stored: StoredDeletedPhoto) -> Result<Self, Self::Error> {
        let deleted_at = DateTime::parse_from_rfc3339(&stored.deleted_at)
            .map_err(|e| {
                AppError::Serialization(format!(
                    "Invalid deletedAt '{}' for photo {}: {}",
                    stored.deleted_at, stored.id, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: stored.id,
            image_uri: stored.image_uri,
            deleted_at,
            original_index: stored.original_index,
        })
    }
}

/// Encodes the recycle bin as a JSON array
pub fn encode_deleted_photos(photos: &[DeletedPhoto]) -> Result<String, AppError> {
    let stored: Vec<StoredDeletedPhoto> = photos.iter().map(StoredDeletedPhoto::from).collect();
    Ok(serde_json::to_string(&stored)?)
}

/// Decodes a stored recycle bin.
///
/// Entries with an unreadable date are dropped; of entries sharing an id only
/// the first is kept. Malformed JSON is an error.
pub fn decode_deleted_photos(raw: &str) -> Result<Vec<DeletedPhoto>, AppError> {
    let stored: Vec<StoredDeletedPhoto> = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    let mut photos = Vec::with_capacity(stored.len());

    for entry in stored {
        match DeletedPhoto::try_from(entry) {
            Ok(photo) => {
                if seen.insert(photo.id.clone()) {
                    photos.push(photo);
                } else {
                    log::warn!("Dropping duplicate recycle bin entry {}", photo.id);
                }
            }
            Err(e) => log::warn!("Dropping unreadable recycle bin entry: {}", e),
        }
    }

    Ok(photos)
}
