// pointer.rs - Global Pointer Position

use device_query::{DeviceQuery, DeviceState};

use crate::geometry::Point;

/// Source of the live pointer position in desktop points
pub trait PointerSource {
    fn position(&self) -> Point;
}

/// Reads the pointer through device_query
pub struct SystemPointer {
    device_state: DeviceState,
}

impl Default for SystemPointer {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPointer {
    pub fn new() -> Self {
        Self {
            device_state: DeviceState::new(),
        }
    }
}

impl PointerSource for SystemPointer {
    fn position(&self) -> Point {
        let (x, y) = self.device_state.get_mouse().coords;
        Point::new(x as f64, y as f64)
    }
}
