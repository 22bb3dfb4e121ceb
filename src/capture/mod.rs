// capture/mod.rs - Screen Capture Module
//
// The magnifier takes one synchronous snapshot of a small screen region per
// redraw tick. Backends implement `CaptureEngine`; the default backend reads
// the primary monitor through xcap.

mod monitor;

pub use monitor::MonitorCaptureEngine;

use image::RgbaImage;

use crate::geometry::Rect;

/// Screen region to capture, in whole points relative to the captured
/// screen's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a desktop-space rectangle into a screen-relative integer
    /// region. Rounding never lets the region spill past the screen edge.
    pub fn from_desktop(rect: &Rect, screen: &Rect) -> Self {
        let screen_w = screen.width.max(1.0).round() as u32;
        let screen_h = screen.height.max(1.0).round() as u32;

        let width = (rect.width.round().max(1.0) as u32).min(screen_w);
        let height = (rect.height.round().max(1.0) as u32).min(screen_h);

        let x = ((rect.x - screen.x).round().max(0.0) as u32).min(screen_w - width);
        let y = ((rect.y - screen.y).round().max(0.0) as u32).min(screen_h - height);

        Self { x, y, width, height }
    }
}

/// A captured frame
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// RGBA pixels, possibly at a higher density than the requested region
    pub image: RgbaImage,
}

/// Trait for screen capture backends
pub trait CaptureEngine {
    /// Bounds of the captured screen in desktop points
    fn screen_bounds(&self) -> Rect;

    /// Take a blocking snapshot of `region`. Returns `None` when the OS
    /// refuses (missing permission, transient failure); callers skip the
    /// frame.
    fn snapshot(&mut self, region: &CaptureRect) -> Option<CaptureFrame>;
}

/// Create the capture engine for the primary monitor
pub fn create_capture_engine() -> anyhow::Result<Box<dyn CaptureEngine>> {
    Ok(Box::new(MonitorCaptureEngine::primary()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_desktop_offsets_by_screen_origin() {
        let screen = Rect::new(100.0, 50.0, 1920.0, 1080.0);
        let rect = Rect::new(580.0, 320.0, 960.0, 540.0);
        assert_eq!(
            CaptureRect::from_desktop(&rect, &screen),
            CaptureRect::new(480, 270, 960, 540)
        );
    }

    #[test]
    fn test_from_desktop_rounding_stays_on_screen() {
        let screen = Rect::new(0.0, 0.0, 1440.0, 900.0);
        let rect = Rect::new(1100.4, 674.6, 339.6, 225.4);
        let region = CaptureRect::from_desktop(&rect, &screen);
        assert!(region.x + region.width <= 1440);
        assert!(region.y + region.height <= 900);
    }
}
