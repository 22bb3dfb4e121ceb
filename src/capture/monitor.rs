// capture/monitor.rs - Monitor Capture Backend
//
// Uses xcap to snapshot a region of the primary monitor. The overlay and HUD
// windows are content-protected, so the OS leaves them out of the image.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use xcap::Monitor;

use super::{CaptureEngine, CaptureFrame, CaptureRect};
use crate::geometry::Rect;

/// Captures regions of a single monitor
pub struct MonitorCaptureEngine {
    monitor: Monitor,
    bounds: Rect,
    failures: u64,
}

impl MonitorCaptureEngine {
    /// Open the primary monitor, falling back to the first one listed
    pub fn primary() -> Result<Self> {
        let monitors = Monitor::all().context("Failed to enumerate monitors")?;
        let index = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors
            .into_iter()
            .nth(index)
            .ok_or_else(|| anyhow!("No monitor available for capture"))?;

        let bounds = monitor_bounds(&monitor)?;
        info!(
            "Capturing monitor {:?} at ({}, {}) {}x{}",
            monitor.name().unwrap_or_default(),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );

        Ok(Self {
            monitor,
            bounds,
            failures: 0,
        })
    }
}

fn monitor_bounds(monitor: &Monitor) -> Result<Rect> {
    let x = monitor.x().context("Failed to read monitor x")?;
    let y = monitor.y().context("Failed to read monitor y")?;
    let width = monitor.width().context("Failed to read monitor width")?;
    let height = monitor.height().context("Failed to read monitor height")?;
    Ok(Rect::new(x as f64, y as f64, width as f64, height as f64))
}

impl CaptureEngine for MonitorCaptureEngine {
    fn screen_bounds(&self) -> Rect {
        self.bounds
    }

    fn snapshot(&mut self, region: &CaptureRect) -> Option<CaptureFrame> {
        match self
            .monitor
            .capture_region(region.x, region.y, region.width, region.height)
        {
            Ok(image) => {
                if self.failures > 0 {
                    info!("Screen capture recovered after {} failed frames", self.failures);
                    self.failures = 0;
                }
                Some(CaptureFrame { image })
            }
            Err(e) => {
                // First failure usually means screen recording permission is missing
                if self.failures == 0 {
                    warn!("Screen capture unavailable: {}", e);
                } else {
                    debug!("Screen capture failed: {}", e);
                }
                self.failures += 1;
                None
            }
        }
    }
}
