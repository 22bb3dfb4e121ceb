// platform/macos.rs - macOS Platform Implementation
//
// Screen recording permission lives in System Settings > Privacy & Security.

use anyhow::{Context, Result};

const SCREEN_CAPTURE_PANE: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";

pub fn open_screen_recording_settings() -> Result<()> {
    open::that(SCREEN_CAPTURE_PANE).context("Failed to open System Settings")
}
