// zoom.rs - Zoom Level Handling
//
// Converts scroll input into zoom changes and keeps every zoom factor inside
// its valid range.

use crate::constants::zoom::{
    PRESET_MAX, PRESET_MIN, PRESET_STEP, SCROLL_SENSITIVITY, SESSION_MAX, SESSION_MIN,
};

/// Clamp a zoom factor into the in-session range
pub fn clamp_session(level: f64) -> f64 {
    if level.is_nan() {
        return SESSION_MIN;
    }
    level.clamp(SESSION_MIN, SESSION_MAX)
}

/// Clamp a default zoom level into the selectable range and snap it to the
/// nearest step.
pub fn snap_preset(level: f64) -> f64 {
    if level.is_nan() {
        return PRESET_MIN;
    }
    let snapped = (level / PRESET_STEP).round() * PRESET_STEP;
    snapped.clamp(PRESET_MIN, PRESET_MAX)
}

/// All selectable default zoom levels, lowest first
pub fn preset_levels() -> Vec<f64> {
    let steps = ((PRESET_MAX - PRESET_MIN) / PRESET_STEP).round() as usize;
    (0..=steps)
        .map(|i| PRESET_MIN + i as f64 * PRESET_STEP)
        .collect()
}

/// Format a zoom level the way the HUD and menus show it
pub fn format_level(level: f64) -> String {
    format!("{:.1}x", level)
}

/// Scroll input as delivered by the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    /// Notched wheel, in lines
    Lines(f64),
    /// Trackpad or precise wheel, in logical points
    Points(f64),
}

impl ScrollDelta {
    /// Vertical scroll distance in points
    pub fn vertical_points(self) -> f64 {
        match self {
            ScrollDelta::Lines(lines) => lines * crate::constants::zoom::POINTS_PER_LINE,
            ScrollDelta::Points(points) => points,
        }
    }
}

/// Owns the live zoom factor of a session
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    level: f64,
}

impl ZoomController {
    /// Start at `initial`, clamped into the session range
    pub fn new(initial: f64) -> Self {
        Self {
            level: clamp_session(initial),
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Apply one scroll event.
    ///
    /// Returns the new level when it changed, `None` when the clamped result
    /// equals the current level.
    pub fn apply_scroll(&mut self, vertical_points: f64) -> Option<f64> {
        let delta = vertical_points * SCROLL_SENSITIVITY;
        if !delta.is_finite() {
            return None;
        }

        let proposed = clamp_session(self.level + delta);
        if proposed == self.level {
            return None;
        }

        self.level = proposed;
        Some(proposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_commits_within_range() {
        let mut zoom = ZoomController::new(2.0);
        let changed = zoom.apply_scroll(100.0).expect("level should change");
        assert!((changed - 5.0).abs() < 1e-9);
        assert!((zoom.level() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_scroll_clamps_at_both_ends() {
        let mut zoom = ZoomController::new(9.9);
        assert_eq!(zoom.apply_scroll(1_000.0), Some(SESSION_MAX));
        assert_eq!(zoom.apply_scroll(50.0), None);

        let mut zoom = ZoomController::new(1.6);
        assert_eq!(zoom.apply_scroll(-1_000.0), Some(SESSION_MIN));
        assert_eq!(zoom.apply_scroll(-1.0), None);
    }

    #[test]
    fn test_zero_scroll_is_not_a_change() {
        let mut zoom = ZoomController::new(3.0);
        assert_eq!(zoom.apply_scroll(0.0), None);
        assert_eq!(zoom.level(), 3.0);
    }

    #[test]
    fn test_any_delta_stays_in_range() {
        let deltas = [-1e9, -333.0, -1.0, -0.01, 0.0, 0.01, 7.5, 250.0, 1e9, f64::NAN];
        let mut zoom = ZoomController::new(2.0);
        for delta in deltas {
            zoom.apply_scroll(delta);
            assert!((SESSION_MIN..=SESSION_MAX).contains(&zoom.level()));
        }
    }

    #[test]
    fn test_initial_level_is_clamped() {
        assert_eq!(ZoomController::new(1.0).level(), SESSION_MIN);
        assert_eq!(ZoomController::new(42.0).level(), SESSION_MAX);
        assert_eq!(ZoomController::new(f64::NAN).level(), SESSION_MIN);
    }

    #[test]
    fn test_preset_levels_cover_range_in_half_steps() {
        let levels = preset_levels();
        assert_eq!(levels.len(), 11);
        assert_eq!(levels.first(), Some(&1.0));
        assert_eq!(levels.last(), Some(&6.0));
        assert_eq!(levels[3], 2.5);
    }

    #[test]
    fn test_snap_preset() {
        assert_eq!(snap_preset(2.2), 2.0);
        assert_eq!(snap_preset(2.3), 2.5);
        assert_eq!(snap_preset(0.2), 1.0);
        assert_eq!(snap_preset(12.0), 6.0);
    }

    #[test]
    fn test_line_deltas_scale_to_points() {
        assert_eq!(ScrollDelta::Lines(-2.0).vertical_points(), -20.0);
        assert_eq!(ScrollDelta::Points(3.5).vertical_points(), 3.5);
    }

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(2.0), "2.0x");
        assert_eq!(format_level(3.456), "3.5x");
    }
}
