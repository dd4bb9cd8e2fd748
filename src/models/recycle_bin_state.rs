use super::DeletedPhoto;

/// Everything the recycle bin knows, as one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecycleBinState {
    /// Most recent first, unique by id. Every entry still exists on the device.
    pub deleted_photos: Vec<DeletedPhoto>,
    /// Photos ever swiped into the bin; restores do not decrement it
    pub total_deleted: u64,
    pub xp: u32,
    pub is_xp_loaded: bool,
    pub onboarding_completed: bool,
    /// Suppresses all XP changes
    pub zen_mode: bool,
    pub navigation_mode: bool,
}

impl RecycleBinState {
    pub fn contains(&self, id: &str) -> bool {
        self.deleted_photos.iter().any(|p| p.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.deleted_photos.iter().position(|p| p.id == id)
    }

    pub fn photos_count(&self) -> usize {
        self.deleted_photos.len()
    }
}
