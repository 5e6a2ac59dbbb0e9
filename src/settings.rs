//! Game settings
//!
//! Read from a JSON file; every field is optional and falls back to its default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_TARGET_RATE;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Logical updates per second
    pub target_rate: u32,

    // === Viewport ===
    pub width: i32,
    pub height: i32,

    // === Simulation ===
    /// Worm steering seed; drawn at random when absent
    pub seed: Option<u64>,

    // === HUD ===
    /// Frame count, FPS/UPS and time labels
    pub show_stats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_rate: DEFAULT_TARGET_RATE,
            width: 800,
            height: 600,
            seed: None,
            show_stats: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let settings = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.target_rate == 0 {
            return Err(SettingsError::Invalid("target_rate must be positive".into()));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(SettingsError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Length of one logical frame
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.target_rate.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.target_rate, 60);
        assert_eq!((settings.width, settings.height), (800, 600));
        assert!(settings.validate().is_ok());
        assert_eq!(settings.period(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "target_rate": 30, "seed": 7 }"#).unwrap();
        assert_eq!(settings.target_rate, 30);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.width, 800);
        assert!(settings.show_stats);
    }

    #[test]
    fn test_rejects_zero_rate_and_empty_viewport() {
        assert!(matches!(
            Settings::from_json(r#"{ "target_rate": 0 }"#),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "width": -5 }"#),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ target_rate: "),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            seed: Some(42),
            show_stats: false,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_and_save_file() {
        let path = std::env::temp_dir()
            .join(format!("worm-chase-settings-{}.json", std::process::id()));
        let settings = Settings {
            target_rate: 50,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);

        assert!(matches!(Settings::load(&path), Err(SettingsError::Io(_))));
    }
}
