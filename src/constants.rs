// constants.rs - Application-wide Constants
//
// Centralized constants for zoom ranges, HUD and crosshair geometry, colors
// and the redraw cadence.

use std::time::Duration;

/// Zoom factor limits and scroll behavior
pub mod zoom {
    /// Lowest zoom factor reachable while a session is running
    pub const SESSION_MIN: f64 = 1.5;
    /// Highest zoom factor reachable while a session is running
    pub const SESSION_MAX: f64 = 10.0;
    /// Lowest selectable default zoom level
    pub const PRESET_MIN: f64 = 1.0;
    /// Highest selectable default zoom level
    pub const PRESET_MAX: f64 = 6.0;
    /// Granularity of the default zoom selection
    pub const PRESET_STEP: f64 = 0.5;
    /// Zoom level used when nothing has been saved yet
    pub const DEFAULT_LEVEL: f64 = 2.0;
    /// Levels offered as one-click "Quick Zoom" entries
    pub const QUICK_LEVELS: [f64; 4] = [2.0, 3.0, 4.0, 5.0];
    /// Zoom change per point of vertical scroll
    pub const SCROLL_SENSITIVITY: f64 = 0.03;
    /// Points per line for wheels that report line deltas
    pub const POINTS_PER_LINE: f64 = 10.0;
}

/// Redraw cadence
pub mod frame {
    use super::Duration;

    /// Target redraw rate
    pub const RATE_HZ: u32 = 60;

    /// Interval between redraw ticks
    pub const fn interval() -> Duration {
        Duration::from_nanos(1_000_000_000 / RATE_HZ as u64)
    }
}

/// Heads-up display pill
pub mod hud {
    /// Pill width in points
    pub const WIDTH: u32 = 280;
    /// Pill height in points
    pub const HEIGHT: u32 = 44;
    /// Gap between the top of the screen and the pill
    pub const TOP_MARGIN: u32 = 20;
    /// Inset of the pill inside its surface
    pub const INSET: u32 = 2;
    /// Static exit key label
    pub const EXIT_KEY_LABEL: &str = "ESC";
    /// Static exit caption
    pub const EXIT_CAPTION: &str = "to exit";
    /// Static scroll hint
    pub const SCROLL_HINT: &str = "scroll";
}

/// Crosshair glyph drawn over the magnified image
pub mod crosshair {
    /// Half-length of each arm in points
    pub const ARM: u32 = 20;
    /// Width of the dark outline stroke
    pub const OUTLINE_WIDTH: u32 = 4;
    /// Width of the light stroke
    pub const LINE_WIDTH: u32 = 2;
}

/// Colors (RGBA)
pub mod colors {
    /// Pill background, dark and mostly opaque
    pub const HUD_FILL: [u8; 4] = [26, 26, 26, 217];
    /// Subtle pill border
    pub const HUD_BORDER: [u8; 4] = [77, 77, 77, 128];
    /// Background of the exit key badge
    pub const HUD_BADGE: [u8; 4] = [64, 64, 64, 255];
    /// Divider between the exit hint and the zoom level
    pub const HUD_DIVIDER: [u8; 4] = [77, 77, 77, 204];
    /// Primary text
    pub const TEXT_WHITE: [u8; 4] = [255, 255, 255, 255];
    /// Secondary text
    pub const TEXT_GRAY: [u8; 4] = [179, 179, 179, 255];
    /// Hint text
    pub const TEXT_DIM: [u8; 4] = [128, 128, 128, 255];
    /// Crosshair outline
    pub const CROSSHAIR_OUTLINE: [u8; 4] = [0, 0, 0, 153];
    /// Crosshair line
    pub const CROSSHAIR_LINE: [u8; 4] = [255, 255, 255, 255];
    /// Tray icon glyph
    pub const TRAY_GLYPH: [u8; 4] = [255, 255, 255, 255];
}

/// Settings file location
pub mod settings {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "ZoomIt";
    /// File name of the JSON preferences
    pub const FILE_NAME: &str = "settings.json";
}
