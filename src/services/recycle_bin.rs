//! Recycle bin: the record of soft-deleted photos and the XP they earn.
//!
//! A photo id in the bin has not been deleted from the device yet. Entries
//! leave the bin only when they are restored, or after the media store has
//! confirmed their physical deletion.
//!
//! Every mutating operation holds the state lock until its storage and media
//! store calls have finished, so operations never interleave.
//!
//! Storage failures are logged and swallowed: the in-memory state stays
//! authoritative for the session and the next successful write reconciles.

use crate::config::RecycleBinConfig;
use crate::models::{decode_deleted_photos, encode_deleted_photos, DeletedPhoto, RecycleBinState};
use crate::storage::{
    KeyValueStore, DELETED_PHOTOS_KEY, NAVIGATION_MODE_KEY, ONBOARDING_COMPLETED_KEY,
    TOTAL_DELETED_KEY, XP_KEY, ZEN_MODE_KEY,
};
use chrono::{DateTime, Utc};
use photo_gallery::MediaStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
enum XpChange {
    Add(u32),
    Subtract(u32),
}

fn flag_value(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}

/// Recycle bin engine with injected storage and media store
pub struct RecycleBin {
    store: Arc<dyn KeyValueStore>,
    media: Arc<dyn MediaStore>,
    config: RecycleBinConfig,
    state: Mutex<RecycleBinState>,
}

impl RecycleBin {
    /// Creates an empty engine; call [`hydrate`](Self::hydrate) to load persisted state
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        media: Arc<dyn MediaStore>,
        config: RecycleBinConfig,
    ) -> Self {
        Self {
            store,
            media,
            config,
            state: Mutex::new(RecycleBinState::default()),
        }
    }

    pub fn config(&self) -> &RecycleBinConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Persistence helpers
    // ---------------------------------------------------------------------

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            log::error!("Failed to persist {}: {}", key, e);
        }
    }

    async fn persist_photos(&self, photos: &[DeletedPhoto]) {
        match encode_deleted_photos(photos) {
            Ok(raw) => self.persist(DELETED_PHOTOS_KEY, &raw).await,
            Err(e) => log::error!("Failed to encode recycle bin: {}", e),
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to load {}: {}", key, e);
                None
            }
        }
    }

    /// Reads a decimal counter; unreadable or negative values count as 0
    async fn read_counter(&self, key: &str) -> Option<u64> {
        let raw = self.read(key).await?;
        match raw.trim().parse::<i64>() {
            Ok(value) => Some(u64::try_from(value).unwrap_or(0)),
            Err(e) => {
                log::warn!("Ignoring unreadable value '{}' for {}: {}", raw, key, e);
                Some(0)
            }
        }
    }

    async fn read_flag(&self, key: &str) -> Option<bool> {
        self.read(key).await.map(|raw| raw == "true")
    }

    /// Deletes `ids` from the device; `false` on refusal or error
    async fn delete_from_device(&self, ids: &[String]) -> bool {
        match self.media.delete_assets(ids).await {
            Ok(true) => true,
            Ok(false) => {
                log::warn!("Media store did not delete {} asset(s)", ids.len());
                false
            }
            Err(e) => {
                log::error!("Media store delete of {} asset(s) failed: {}", ids.len(), e);
                false
            }
        }
    }

    async fn change_xp(&self, state: &mut RecycleBinState, change: XpChange) {
        if state.zen_mode {
            log::debug!("Zen mode on, ignoring XP change {:?}", change);
            return;
        }

        state.xp = match change {
            XpChange::Add(n) => state.xp.saturating_add(n),
            XpChange::Subtract(n) => state.xp.saturating_sub(n),
        };
        self.persist(XP_KEY, &state.xp.to_string()).await;
    }

    // ---------------------------------------------------------------------
    // Hydration
    // ---------------------------------------------------------------------

    /// Loads every persisted value into memory
    pub async fn hydrate(&self) {
        self.load_deleted_photos().await;
        self.load_xp().await;
        self.load_total_deleted().await;
        self.check_onboarding_status().await;
        self.load_zen_mode().await;
        self.load_navigation_mode().await;
    }

    pub async fn load_deleted_photos(&self) {
        let mut state = self.state.lock().await;
        let Some(raw) = self.read(DELETED_PHOTOS_KEY).await else {
            return;
        };
        match decode_deleted_photos(&raw) {
            Ok(photos) => {
                log::info!("Loaded {} photos from the recycle bin", photos.len());
                state.deleted_photos = photos;
            }
            Err(e) => log::error!("Failed to decode recycle bin: {}", e),
        }
    }

    pub async fn load_xp(&self) {
        let mut state = self.state.lock().await;
        if let Some(xp) = self.read_counter(XP_KEY).await {
            state.xp = u32::try_from(xp).unwrap_or(u32::MAX);
        }
        state.is_xp_loaded = true;
    }

    pub async fn load_total_deleted(&self) {
        let mut state = self.state.lock().await;
        if let Some(total) = self.read_counter(TOTAL_DELETED_KEY).await {
            state.total_deleted = total;
        }
    }

    pub async fn load_zen_mode(&self) {
        let mut state = self.state.lock().await;
        if let Some(enabled) = self.read_flag(ZEN_MODE_KEY).await {
            state.zen_mode = enabled;
        }
    }

    pub async fn load_navigation_mode(&self) {
        let mut state = self.state.lock().await;
        if let Some(enabled) = self.read_flag(NAVIGATION_MODE_KEY).await {
            state.navigation_mode = enabled;
        }
    }

    // ---------------------------------------------------------------------
    // Recycle bin transitions
    // ---------------------------------------------------------------------

    /// Soft-deletes a photo. The device copy is left alone.
    ///
    /// Returns `false` without any change when the id is already in the bin.
    pub async fn add_deleted_photo(&self, photo: DeletedPhoto) -> bool {
        let mut state = self.state.lock().await;
        if state.contains(&photo.id) {
            log::debug!("Photo {} already in recycle bin", photo.id);
            return false;
        }

        log::debug!("Soft-deleting photo {}", photo.id);
        state.deleted_photos.insert(0, photo);
        self.persist_photos(&state.deleted_photos).await;

        state.total_deleted = state.total_deleted.saturating_add(1);
        self.persist(TOTAL_DELETED_KEY, &state.total_deleted.to_string())
            .await;

        self.change_xp(&mut state, XpChange::Add(self.config.xp.delete_photo))
            .await;
        true
    }

    /// Takes a photo back out of the bin and returns its record
    pub async fn restore_photo(&self, id: &str) -> Option<DeletedPhoto> {
        let mut state = self.state.lock().await;
        let pos = state.position(id)?;

        let photo = state.deleted_photos.remove(pos);
        self.persist_photos(&state.deleted_photos).await;
        self.change_xp(&mut state, XpChange::Subtract(self.config.xp.restore_photo))
            .await;

        log::info!("Restored photo {}", id);
        Some(photo)
    }

    /// Deletes one photo from the device, then drops it from the bin.
    ///
    /// When the media store refuses or errors, the entry and XP stay as they
    /// were and `false` is returned so the user can retry.
    pub async fn permanently_delete(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        let Some(pos) = state.position(id) else {
            log::debug!("Photo {} not in recycle bin", id);
            return false;
        };

        if !self.delete_from_device(&[id.to_string()]).await {
            log::warn!("Photo {} kept in recycle bin after failed deletion", id);
            return false;
        }

        state.deleted_photos.remove(pos);
        self.persist_photos(&state.deleted_photos).await;
        self.change_xp(
            &mut state,
            XpChange::Add(self.config.xp.permanent_delete),
        )
        .await;

        log::info!("Permanently deleted photo {}", id);
        true
    }

    /// Deletes every photo in the bin from the device, then empties the bin.
    ///
    /// An empty bin succeeds without contacting the media store. On failure
    /// nothing is removed and no XP is awarded.
    pub async fn clear_recycle_bin(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.deleted_photos.is_empty() {
            return true;
        }

        let ids: Vec<String> = state.deleted_photos.iter().map(|p| p.id.clone()).collect();
        if !self.delete_from_device(&ids).await {
            log::warn!("Recycle bin kept all {} photos after failed deletion", ids.len());
            return false;
        }

        let count = ids.len();
        state.deleted_photos.clear();
        self.persist_photos(&state.deleted_photos).await;
        self.change_xp(
            &mut state,
            XpChange::Add(self.config.xp.clear_all_for(count)),
        )
        .await;

        log::info!("Emptied recycle bin ({} photos)", count);
        true
    }

    /// Permanently deletes photos past the retention window. Never awards XP.
    ///
    /// Returns the number of photos purged.
    pub async fn purge_expired_photos(&self) -> usize {
        self.purge_expired_photos_at(Utc::now()).await
    }

    /// [`purge_expired_photos`](Self::purge_expired_photos) against a given clock.
    ///
    /// When the media store fails, every expired entry stays for the next sweep.
    pub async fn purge_expired_photos_at(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock().await;
        let retention = self.config.retention_days;

        let expired: Vec<String> = state
            .deleted_photos
            .iter()
            .filter(|p| p.is_expired_at(now, retention))
            .map(|p| p.id.clone())
            .collect();
        if expired.is_empty() {
            return 0;
        }

        log::info!("Purging {} expired photos", expired.len());
        if !self.delete_from_device(&expired).await {
            log::warn!("Purge failed, {} expired photos stay for the next sweep", expired.len());
            return 0;
        }

        state
            .deleted_photos
            .retain(|p| !p.is_expired_at(now, retention));
        self.persist_photos(&state.deleted_photos).await;
        expired.len()
    }

    /// Empties the bin (without touching the device) and resets XP to 0
    pub async fn reset_gallery(&self) {
        let mut state = self.state.lock().await;
        state.deleted_photos.clear();
        state.xp = 0;

        self.persist_photos(&state.deleted_photos).await;
        self.persist(XP_KEY, "0").await;
        log::info!("Gallery reset");
    }

    // ---------------------------------------------------------------------
    // XP
    // ---------------------------------------------------------------------

    /// Adds XP; no-op in zen mode
    pub async fn add_xp(&self, amount: u32) {
        let mut state = self.state.lock().await;
        self.change_xp(&mut state, XpChange::Add(amount)).await;
    }

    /// Subtracts XP, stopping at 0; no-op in zen mode
    pub async fn subtract_xp(&self, amount: u32) {
        let mut state = self.state.lock().await;
        self.change_xp(&mut state, XpChange::Subtract(amount)).await;
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    /// Loads the onboarding flag; falls back to the in-memory value when storage fails
    pub async fn check_onboarding_status(&self) -> bool {
        let mut state = self.state.lock().await;
        if let Some(completed) = self.read_flag(ONBOARDING_COMPLETED_KEY).await {
            state.onboarding_completed = completed;
        }
        state.onboarding_completed
    }

    pub async fn complete_onboarding(&self) {
        let mut state = self.state.lock().await;
        state.onboarding_completed = true;
        self.persist(ONBOARDING_COMPLETED_KEY, flag_value(true)).await;
    }

    pub async fn reset_onboarding(&self) {
        let mut state = self.state.lock().await;
        state.onboarding_completed = false;
        self.persist(ONBOARDING_COMPLETED_KEY, flag_value(false)).await;
    }

    pub async fn set_zen_mode(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        state.zen_mode = enabled;
        self.persist(ZEN_MODE_KEY, flag_value(enabled)).await;
    }

    /// Flips zen mode and returns the new value
    pub async fn toggle_zen_mode(&self) -> bool {
        let mut state = self.state.lock().await;
        state.zen_mode = !state.zen_mode;
        self.persist(ZEN_MODE_KEY, flag_value(state.zen_mode)).await;
        state.zen_mode
    }

    pub async fn set_navigation_mode(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        state.navigation_mode = enabled;
        self.persist(NAVIGATION_MODE_KEY, flag_value(enabled)).await;
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub async fn state(&self) -> RecycleBinState {
        self.state.lock().await.clone()
    }

    pub async fn deleted_photos(&self) -> Vec<DeletedPhoto> {
        self.state.lock().await.deleted_photos.clone()
    }

    pub async fn xp(&self) -> u32 {
        self.state.lock().await.xp
    }

    pub async fn total_deleted(&self) -> u64 {
        self.state.lock().await.total_deleted
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.contains(id)
    }

    /// Photos the next purge at `now` would pick up
    pub async fn expired_photos_at(&self, now: DateTime<Utc>) -> Vec<DeletedPhoto> {
        let retention = self.config.retention_days;
        self.state
            .lock()
            .await
            .deleted_photos
            .iter()
            .filter(|p| p.is_expired_at(now, retention))
            .cloned()
            .collect()
    }
}
