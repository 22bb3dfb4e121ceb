// magnifier.rs - Per-frame Capture Step
//
// One redraw tick: take the pointer position, work out which part of the
// screen to magnify, and snapshot it. Drawing the result is left to the
// renderer; this step mutates nothing.

use log::trace;

use crate::capture::{CaptureEngine, CaptureFrame, CaptureRect};
use crate::geometry::{capture_rect, Point};
use crate::session::Session;

/// Compute the region around `pointer` and snapshot it. The returned pixels
/// are stretched over the whole overlay surface.
///
/// Returns `None` when the snapshot fails; the caller keeps whatever the
/// overlay showed last.
pub fn capture_tick(
    session: &Session,
    pointer: Point,
    engine: &mut dyn CaptureEngine,
) -> Option<CaptureFrame> {
    let screen = engine.screen_bounds();
    let surface = session.surface_bounds().size();
    let source = capture_rect(pointer, surface, session.zoom_level(), screen);
    let region = CaptureRect::from_desktop(&source, &screen);

    trace!("Capturing {:?} around pointer {:?}", region, pointer);

    engine.snapshot(&region)
}
