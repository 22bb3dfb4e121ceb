// app/settings.rs - Persisted Preferences
//
// Stored as pretty JSON in the platform config directory. A missing or
// unreadable file falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::constants::{settings, zoom};
use crate::zoom::snap_preset;

/// User preferences that survive restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Zoom level a new session starts at
    pub default_zoom_level: f64,
    /// Draw the crosshair over the magnified image
    pub show_crosshair: bool,
    /// Register the app to start at login
    pub launch_at_login: bool,
    /// The first-run permission walkthrough has been acknowledged
    pub has_completed_onboarding: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_zoom_level: zoom::DEFAULT_LEVEL,
            show_crosshair: true,
            launch_at_login: false,
            has_completed_onboarding: false,
        }
    }
}

impl Preferences {
    /// Default location: `<config dir>/ZoomIt/settings.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(settings::APP_DIR)
            .join(settings::FILE_NAME)
    }

    /// Load from `path`, returning defaults when the file is missing or bad
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(prefs) => {
                    info!("Settings loaded from {:?}", path);
                    prefs.normalized()
                }
                Err(e) => {
                    error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Write to `path`, creating the parent directory when needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create settings directory {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;
        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Bring hand-edited values back into range
    fn normalized(mut self) -> Self {
        self.default_zoom_level = snap_preset(self.default_zoom_level);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("settings.json"));
        assert_eq!(prefs, Preferences::default());
        assert!(prefs.show_crosshair);
        assert_eq!(prefs.default_zoom_level, 2.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let prefs = Preferences {
            default_zoom_level: 4.5,
            show_crosshair: false,
            launch_at_login: true,
            has_completed_onboarding: true,
        };

        prefs.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path), prefs);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "show_crosshair": false }"#).unwrap();

        let prefs = Preferences::load_from(&path);
        assert!(!prefs.show_crosshair);
        assert_eq!(prefs.default_zoom_level, zoom::DEFAULT_LEVEL);
        assert!(!prefs.has_completed_onboarding);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Preferences::load_from(&path), Preferences::default());
    }

    #[test]
    fn test_out_of_range_zoom_is_snapped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "default_zoom_level": 9.3 }"#).unwrap();
        assert_eq!(Preferences::load_from(&path).default_zoom_level, 6.0);
    }
}
