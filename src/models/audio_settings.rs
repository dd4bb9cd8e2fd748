use serde::{Deserialize, Serialize};

/// Sound effect settings, stored as JSON `{ "enabled": bool, "volume": number }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    /// 0.0 to 1.0
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}

impl AudioSettings {
    /// Copy with the volume forced into `0.0..=1.0`
    pub fn clamped(self) -> Self {
        let volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self { volume, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let raw = serde_json::to_string(&AudioSettings { enabled: false, volume: 0.5 }).unwrap();
        assert_eq!(raw, r#"{"enabled":false,"volume":0.5}"#);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: AudioSettings = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert_eq!(settings, AudioSettings { enabled: false, volume: 1.0 });
    }

    #[test]
    fn test_clamped() {
        assert_eq!(AudioSettings { enabled: true, volume: 3.0 }.clamped().volume, 1.0);
        assert_eq!(AudioSettings { enabled: true, volume: -1.0 }.clamped().volume, 0.0);
        assert_eq!(AudioSettings { enabled: true, volume: f32::NAN }.clamped().volume, 1.0);
    }
}
