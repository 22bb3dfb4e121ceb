// app/state.rs - Idle Application State
//
// Preferences plus where they live on disk. Every mutation is written back
// immediately; write failures are logged and otherwise ignored.

use std::path::PathBuf;

use log::warn;

use super::settings::Preferences;
use crate::zoom::snap_preset;

/// Main application state outside of a zoom session
#[derive(Debug)]
pub struct AppState {
    pub preferences: Preferences,
    settings_path: PathBuf,
}

impl AppState {
    /// Load preferences from `settings_path`
    pub fn load(settings_path: PathBuf) -> Self {
        let preferences = Preferences::load_from(&settings_path);
        Self {
            preferences,
            settings_path,
        }
    }

    pub fn default_zoom_level(&self) -> f64 {
        self.preferences.default_zoom_level
    }

    /// Select the default zoom level; returns the stored (snapped) value
    pub fn set_default_zoom_level(&mut self, level: f64) -> f64 {
        let level = snap_preset(level);
        if self.preferences.default_zoom_level != level {
            self.preferences.default_zoom_level = level;
            self.persist();
        }
        level
    }

    /// Toggle crosshair visibility; returns the new value
    pub fn toggle_crosshair(&mut self) -> bool {
        self.preferences.show_crosshair = !self.preferences.show_crosshair;
        self.persist();
        self.preferences.show_crosshair
    }

    pub fn set_launch_at_login(&mut self, enabled: bool) {
        if self.preferences.launch_at_login != enabled {
            self.preferences.launch_at_login = enabled;
            self.persist();
        }
    }

    pub fn set_onboarding_completed(&mut self, completed: bool) {
        if self.preferences.has_completed_onboarding != completed {
            self.preferences.has_completed_onboarding = completed;
            self.persist();
        }
    }

    fn persist(&self) {
        if let Err(e) = self.preferences.save_to(&self.settings_path) {
            warn!("Failed to save settings: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_changes_are_written_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut state = AppState::load(path.clone());
        assert_eq!(state.set_default_zoom_level(3.2), 3.0);
        assert!(!state.toggle_crosshair());
        state.set_onboarding_completed(true);

        let reloaded = Preferences::load_from(&path);
        assert_eq!(reloaded.default_zoom_level, 3.0);
        assert!(!reloaded.show_crosshair);
        assert!(reloaded.has_completed_onboarding);
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        // Parent is a regular file, so the save fails
        let mut state = AppState::load(blocker.join("settings.json"));
        state.set_launch_at_login(true);
        assert!(state.preferences.launch_at_login);
    }
}
