// hud.rs - Heads-up Display
//
// The floating pill that shows how to leave the zoom and the current zoom
// level. It keeps the last level it was told about and only asks for a
// redraw when that level changes.

use image::RgbaImage;

use crate::constants::{colors, hud};
use crate::font::{draw_text, line_height, text_width};
use crate::paint::{fill_rect, fill_rounded_rect, stroke_rounded_rect};
use crate::zoom::format_level;

/// HUD state: last-known zoom level and a dirty flag
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    zoom_level: f64,
    needs_redraw: bool,
    notifications: u64,
}

impl Hud {
    /// A new HUD needs one initial draw
    pub fn new(zoom_level: f64) -> Self {
        Self {
            zoom_level,
            needs_redraw: true,
            notifications: 0,
        }
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Called by the zoom controller whenever it commits a new level
    pub fn zoom_level_changed(&mut self, level: f64) {
        self.zoom_level = level;
        self.needs_redraw = true;
        self.notifications += 1;
    }

    /// Number of change notifications received so far
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Ask for a redraw without a level change (surface resized)
    pub fn invalidate(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns true once per pending redraw and clears the flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Text shown for the zoom level, e.g. "2.5x"
    pub fn level_label(&self) -> String {
        format_level(self.zoom_level)
    }

    /// Rasterize the pill at `pixel_scale` pixels per point. The returned
    /// image is transparent outside the pill.
    pub fn render(&self, pixel_scale: u32) -> RgbaImage {
        let s = pixel_scale.max(1) as i32;
        let width = hud::WIDTH as i32 * s;
        let height = hud::HEIGHT as i32 * s;
        let mut image = RgbaImage::new(width as u32, height as u32);

        // Pill background and border
        let inset = hud::INSET as i32 * s;
        let pill_w = width - 2 * inset;
        let pill_h = height - 2 * inset;
        let radius = pill_h as f32 / 2.0;
        fill_rounded_rect(&mut image, inset, inset, pill_w, pill_h, radius, colors::HUD_FILL);
        stroke_rounded_rect(&mut image, inset, inset, pill_w, pill_h, radius, colors::HUD_BORDER);

        // Exit key badge
        let badge_x = 14 * s;
        let badge_w = 36 * s;
        let badge_h = 22 * s;
        let badge_y = (height - badge_h) / 2;
        fill_rounded_rect(&mut image, badge_x, badge_y, badge_w, badge_h, 6.0 * s as f32, colors::HUD_BADGE);
        let key_w = text_width(hud::EXIT_KEY_LABEL, s);
        draw_text(
            &mut image,
            badge_x + (badge_w - key_w) / 2,
            (height - line_height(s)) / 2,
            hud::EXIT_KEY_LABEL,
            colors::TEXT_WHITE,
            s,
        );

        draw_text(
            &mut image,
            58 * s,
            (height - line_height(s)) / 2,
            hud::EXIT_CAPTION,
            colors::TEXT_GRAY,
            s,
        );

        // Divider
        fill_rect(&mut image, 115 * s, 10 * s, s, height - 20 * s, colors::HUD_DIVIDER);

        // Zoom level, twice the caption size
        let level_scale = 2 * s;
        draw_text(
            &mut image,
            125 * s,
            (height - line_height(level_scale)) / 2,
            &self.level_label(),
            colors::TEXT_WHITE,
            level_scale,
        );

        let hint = format!("{} ↕", hud::SCROLL_HINT);
        draw_text(
            &mut image,
            195 * s,
            (height - line_height(s)) / 2,
            &hint,
            colors::TEXT_DIM,
            s,
        );

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hud_wants_first_draw() {
        let mut hud = Hud::new(2.0);
        assert!(hud.take_redraw());
        assert!(!hud.take_redraw());
    }

    #[test]
    fn test_notification_marks_dirty() {
        let mut hud = Hud::new(2.0);
        hud.take_redraw();
        hud.zoom_level_changed(3.3);
        assert_eq!(hud.notifications(), 1);
        assert!(hud.needs_redraw());
        assert_eq!(hud.level_label(), "3.3x");
    }

    #[test]
    fn test_invalidate_keeps_level() {
        let mut hud = Hud::new(4.0);
        assert!(hud.take_redraw());
        assert!(!hud.take_redraw());
        hud.invalidate();
        assert!(hud.take_redraw());
        assert_eq!(hud.notifications(), 0);
        assert_eq!(hud.zoom_level(), 4.0);
    }

    #[test]
    fn test_render_size_and_transparent_corners() {
        let image = Hud::new(2.0).render(2);
        assert_eq!(image.dimensions(), (hud::WIDTH * 2, hud::HEIGHT * 2));
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        // Middle of the pill is filled
        assert!(image.get_pixel(hud::WIDTH, 4 * 2 + 2).0[3] > 0);
    }

    #[test]
    fn test_level_text_changes_pixels() {
        let two = Hud::new(2.0).render(1);
        let nine = Hud::new(9.5).render(1);
        assert_ne!(two.as_raw(), nine.as_raw());
    }
}
