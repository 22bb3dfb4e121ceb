// ui/tray.rs - Menu Bar Icon Implementation
//
// The idle surface of the app: a status icon whose menu starts a zoom
// session and edits the persisted preferences.

use std::collections::HashMap;

use anyhow::Result;
use image::RgbaImage;
use log::{error, info};
use muda::{AboutMetadata, CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::event_loop::EventLoopProxy;

use zoomit::constants::{colors, zoom};
use zoomit::paint::blend_pixel_coverage;
use zoomit::zoom::{format_level, preset_levels};

use crate::UserEvent;

/// What a menu click asks the app to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrayCommand {
    /// Start a session at the default zoom level
    StartZoom,
    /// Change the default zoom level
    SetDefaultZoom(f64),
    ToggleCrosshair,
    ToggleLaunchAtLogin,
    OpenPermissionSettings,
    Quit,
}

/// State the menu mirrors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrayState {
    pub default_zoom_level: f64,
    pub show_crosshair: bool,
    pub launch_at_login: bool,
    pub session_active: bool,
}

/// Status icon and the menu items whose text or checkmark changes
pub struct SystemTray {
    _tray_icon: TrayIcon,
    start_zoom: MenuItem,
    zoom_levels: Vec<(f64, CheckMenuItem)>,
    crosshair: CheckMenuItem,
    launch_at_login: CheckMenuItem,
    commands: HashMap<MenuId, TrayCommand>,
}

impl SystemTray {
    /// Build the icon and menu, and forward menu clicks to the event loop
    pub fn new(state: &TrayState, event_proxy: EventLoopProxy<UserEvent>) -> Result<Self> {
        info!("Initializing menu bar icon");

        let mut commands = HashMap::new();

        let start_zoom = MenuItem::new(start_label(state.default_zoom_level), true, None);
        commands.insert(start_zoom.id().clone(), TrayCommand::StartZoom);

        let zoom_menu = Submenu::new("Zoom Level", true);
        let mut zoom_levels = Vec::new();
        for level in preset_levels() {
            let item = CheckMenuItem::new(
                format_level(level),
                true,
                same_level(level, state.default_zoom_level),
                None,
            );
            zoom_menu.append(&item)?;
            commands.insert(item.id().clone(), TrayCommand::SetDefaultZoom(level));
            zoom_levels.push((level, item));
        }

        // Quick entries stay usable during a session and apply to the next one
        let quick_menu = Submenu::new("Quick Zoom", true);
        for level in zoom::QUICK_LEVELS {
            let item = MenuItem::new(quick_label(level), true, None);
            quick_menu.append(&item)?;
            commands.insert(item.id().clone(), quick_zoom_command(level));
        }

        let crosshair = CheckMenuItem::new("Show Crosshair", true, state.show_crosshair, None);
        commands.insert(crosshair.id().clone(), TrayCommand::ToggleCrosshair);

        let launch_at_login = CheckMenuItem::new("Launch at Login", true, state.launch_at_login, None);
        commands.insert(launch_at_login.id().clone(), TrayCommand::ToggleLaunchAtLogin);

        let permission = MenuItem::new("Screen Recording Permission…", true, None);
        commands.insert(permission.id().clone(), TrayCommand::OpenPermissionSettings);

        let about = PredefinedMenuItem::about(
            Some("About ZoomIt"),
            Some(AboutMetadata {
                name: Some("ZoomIt".to_string()),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                comments: Some(env!("CARGO_PKG_DESCRIPTION").to_string()),
                ..Default::default()
            }),
        );

        let quit = MenuItem::new("Quit ZoomIt", true, None);
        commands.insert(quit.id().clone(), TrayCommand::Quit);

        let menu = Menu::new();
        menu.append_items(&[
            &start_zoom,
            &PredefinedMenuItem::separator(),
            &zoom_menu,
            &quick_menu,
            &PredefinedMenuItem::separator(),
            &crosshair,
            &launch_at_login,
            &PredefinedMenuItem::separator(),
            &permission,
            &about,
            &PredefinedMenuItem::separator(),
            &quit,
        ])?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("ZoomIt")
            .with_icon(create_tray_icon()?)
            .with_icon_as_template(true)
            .build()?;

        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            if let Err(e) = event_proxy.send_event(UserEvent::Menu(event)) {
                error!("Failed to forward menu event: {}", e);
            }
        }));

        let mut tray = Self {
            _tray_icon: tray_icon,
            start_zoom,
            zoom_levels,
            crosshair,
            launch_at_login,
            commands,
        };
        tray.sync(state);

        info!("Menu bar icon initialized");
        Ok(tray)
    }

    /// Map a clicked menu item to a command
    pub fn command_for(&self, event: &MenuEvent) -> Option<TrayCommand> {
        self.commands.get(event.id()).copied()
    }

    /// Refresh labels, checkmarks and enabled state
    pub fn sync(&mut self, state: &TrayState) {
        self.start_zoom.set_text(start_label(state.default_zoom_level));
        self.start_zoom.set_enabled(!state.session_active);
        for (level, item) in &self.zoom_levels {
            item.set_checked(same_level(*level, state.default_zoom_level));
        }
        self.crosshair.set_checked(state.show_crosshair);
        self.launch_at_login.set_checked(state.launch_at_login);
    }
}

fn start_label(level: f64) -> String {
    format!("Start Zoom ({})", format_level(level))
}

/// A quick entry selects its level as the default for "Start Zoom"
fn quick_zoom_command(level: f64) -> TrayCommand {
    TrayCommand::SetDefaultZoom(level)
}

fn quick_label(level: f64) -> String {
    format!("{}x", level.round() as u32)
}

fn same_level(a: f64, b: f64) -> bool {
    (a - b).abs() < zoom::PRESET_STEP / 4.0
}

/// Side of the square status icon in pixels
const ICON_SIZE: u32 = 32;

/// Render a magnifying glass: a ring with a handle toward the lower right
fn magnifier_glyph() -> RgbaImage {
    let mut image = RgbaImage::new(ICON_SIZE, ICON_SIZE);
    let size = ICON_SIZE as f32;
    let center = size * 0.42;
    let radius = size * 0.28;
    let ring = size * 0.07;
    let handle_start = center + radius * std::f32::consts::FRAC_1_SQRT_2;
    let handle_end = size * 0.9;
    let handle_half = size * 0.08;

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let dist = ((px - center).powi(2) + (py - center).powi(2)).sqrt();
            let ring_cov = (ring - (dist - radius).abs() + 0.5).clamp(0.0, 1.0);

            // Distance to the 45 degree handle segment
            let t = ((px + py) / 2.0).clamp(handle_start, handle_end);
            let handle_dist = ((px - t).powi(2) + (py - t).powi(2)).sqrt();
            let handle_cov = (handle_half - handle_dist + 0.5).clamp(0.0, 1.0);

            let coverage = ring_cov.max(handle_cov);
            if coverage > 0.0 {
                blend_pixel_coverage(&mut image, x as i32, y as i32, colors::TRAY_GLYPH, coverage);
            }
        }
    }
    image
}

fn create_tray_icon() -> Result<tray_icon::Icon> {
    let glyph = magnifier_glyph();
    let (width, height) = glyph.dimensions();
    Ok(tray_icon::Icon::from_rgba(glyph.into_raw(), width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(start_label(2.0), "Start Zoom (2.0x)");
        assert_eq!(start_label(3.5), "Start Zoom (3.5x)");
        assert_eq!(quick_label(4.0), "4x");
    }

    #[test]
    fn test_quick_zoom_selects_default_level() {
        assert_eq!(quick_zoom_command(4.0), TrayCommand::SetDefaultZoom(4.0));

        // Every quick level has a checkmark entry in the Zoom Level submenu
        let presets = preset_levels();
        for level in zoom::QUICK_LEVELS {
            assert!(presets.iter().any(|preset| same_level(*preset, level)));
        }
    }

    #[test]
    fn test_same_level() {
        assert!(same_level(2.5, 2.5));
        assert!(same_level(2.5, 2.5000001));
        assert!(!same_level(2.5, 3.0));
    }

    #[test]
    fn test_magnifier_glyph_shape() {
        let glyph = magnifier_glyph();
        assert_eq!(glyph.dimensions(), (ICON_SIZE, ICON_SIZE));

        // Lens interior stays clear, ring and handle are drawn
        let center = (ICON_SIZE as f32 * 0.42) as u32;
        assert_eq!(glyph.get_pixel(center, center)[3], 0);
        let ring_x = (ICON_SIZE as f32 * 0.70) as u32;
        assert!(glyph.get_pixel(ring_x, center)[3] > 0);
        assert!(glyph.get_pixel(26, 26)[3] > 0);
        assert_eq!(glyph.get_pixel(0, ICON_SIZE - 1)[3], 0);
    }
}
