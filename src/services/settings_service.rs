use crate::models::AudioSettings;
use crate::storage::{load_json_with, save_json_with, KeyValueStore, AUDIO_SETTINGS_KEY};
use std::sync::Arc;

/// Persistence for user preferences outside the recycle bin
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the audio settings; absent or unreadable values give the defaults
    pub async fn load_audio_settings(&self) -> AudioSettings {
        match load_json_with::<AudioSettings>(self.store.as_ref(), AUDIO_SETTINGS_KEY).await {
            Ok(Some(settings)) => settings.clamped(),
            Ok(None) => AudioSettings::default(),
            Err(e) => {
                log::warn!("Failed to load audio settings, using defaults: {}", e);
                AudioSettings::default()
            }
        }
    }

    /// Saves the audio settings with the volume clamped; failures are only logged
    pub async fn save_audio_settings(&self, settings: AudioSettings) -> AudioSettings {
        let settings = settings.clamped();
        if let Err(e) = save_json_with(self.store.as_ref(), AUDIO_SETTINGS_KEY, &settings).await {
            log::error!("Failed to save audio settings: {}", e);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let service = SettingsService::new(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(service.load_audio_settings().await, AudioSettings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let service = SettingsService::new(store.clone());

        let saved = service
            .save_audio_settings(AudioSettings { enabled: false, volume: 1.7 })
            .await;
        assert_eq!(saved.volume, 1.0);

        assert_eq!(
            store.get(AUDIO_SETTINGS_KEY).await.unwrap(),
            Some(r#"{"enabled":false,"volume":1.0}"#.to_string())
        );
        assert_eq!(service.load_audio_settings().await, saved);
    }

    #[tokio::test]
    async fn test_garbage_gives_defaults() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(AUDIO_SETTINGS_KEY, "loud").await.unwrap();

        let service = SettingsService::new(store);
        assert_eq!(service.load_audio_settings().await, AudioSettings::default());
    }
}
