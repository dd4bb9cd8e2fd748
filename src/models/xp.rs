use serde::{Deserialize, Serialize};

/// XP awarded (or, for restores, taken back) per recycle bin action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpConfig {
    pub delete_photo: u32,
    /// Magnitude only; restoring subtracts this
    pub restore_photo: u32,
    pub permanent_delete: u32,
    /// Per photo removed by "empty recycle bin"
    pub clear_all: u32,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            delete_photo: 10,
            restore_photo: 5,
            permanent_delete: 5,
            clear_all: 2,
        }
    }
}

impl XpConfig {
    /// XP for emptying a bin of `count` photos
    pub fn clear_all_for(&self, count: usize) -> u32 {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        self.clear_all.saturating_mul(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let xp = XpConfig::default();
        assert_eq!(xp.delete_photo, 10);
        assert_eq!(xp.restore_photo, 5);
        assert_eq!(xp.permanent_delete, 5);
        assert_eq!(xp.clear_all_for(2), 4);
    }
}
