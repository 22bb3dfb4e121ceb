// platform/mod.rs - Platform Abstraction Layer
//
// OS services used by the idle menu: opening the screen recording privacy
// pane and registering the app to launch at login.

#[cfg(target_os = "macos")]
pub mod macos;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use auto_launch::{AutoLaunch, AutoLaunchBuilder};
use log::info;

/// Name the login item is registered under
pub const LOGIN_ITEM_NAME: &str = "ZoomIt";

/// Open the OS settings page where screen recording permission is granted
pub fn open_screen_recording_settings() -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        macos::open_screen_recording_settings()
    }
    #[cfg(not(target_os = "macos"))]
    {
        info!("Screen recording needs no extra permission on this platform");
        Ok(())
    }
}

/// Login item that starts `exe`. On macOS it is a per-user LaunchAgent,
/// elsewhere whatever `auto-launch` uses natively (XDG autostart, Run key).
pub fn login_item(exe: &Path) -> Result<AutoLaunch> {
    let path = exe
        .to_str()
        .ok_or_else(|| anyhow!("Executable path is not valid UTF-8: {:?}", exe))?;

    AutoLaunchBuilder::new()
        .set_app_name(LOGIN_ITEM_NAME)
        .set_app_path(path)
        .set_use_launch_agent(true)
        .build()
        .context("Failed to describe login item")
}

/// Register or unregister the current executable as a login item.
/// Enabling rewrites the entry so it follows a moved binary; disabling an
/// absent entry does nothing.
pub fn set_launch_at_login(enabled: bool) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let item = login_item(&exe)?;

    if enabled {
        item.enable().context("Failed to register login item")?;
        info!("Login item registered for {:?}", exe);
    } else if item.is_enabled().context("Failed to query login item")? {
        item.disable().context("Failed to remove login item")?;
        info!("Login item removed");
    }
    Ok(())
}
