// geometry.rs - Capture Rectangle Math
//
// All coordinates are logical points in the global desktop space with a
// top-left origin, the same space the pointer position is reported in.

/// A point in logical desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A size in logical points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in logical points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }
}

/// Compute the region of the screen to sample for one frame.
///
/// The region is the overlay surface shrunk by `zoom`, centered on the
/// pointer, then shifted so it never leaves `screen`. A region larger than
/// the screen (zoom below 1.0) is pinned to the screen origin and cropped.
pub fn capture_rect(pointer: Point, surface: Size, zoom: f64, screen: Rect) -> Rect {
    let width = (surface.width / zoom).min(screen.width);
    let height = (surface.height / zoom).min(screen.height);

    let x = clamp_axis(pointer.x - width / 2.0, screen.x, screen.right() - width);
    let y = clamp_axis(pointer.y - height / 2.0, screen.y, screen.bottom() - height);

    Rect::new(x, y, width, height)
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Top-center placement of the HUD pill on `screen`
pub fn hud_rect(screen: Rect, width: f64, height: f64, top_margin: f64) -> Rect {
    Rect::new(
        screen.x + (screen.width - width) / 2.0,
        screen.y + top_margin,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect { x: 0.0, y: 0.0, width: 1920.0, height: 1080.0 };
    const SURFACE: Size = Size { width: 1920.0, height: 1080.0 };

    #[test]
    fn test_centered_pointer_is_unclamped() {
        let rect = capture_rect(Point::new(960.0, 540.0), SURFACE, 2.0, SCREEN);
        assert_eq!(rect, Rect::new(480.0, 270.0, 960.0, 540.0));
    }

    #[test]
    fn test_pointer_near_origin_clamps_to_zero() {
        let rect = capture_rect(Point::new(10.0, 10.0), SURFACE, 2.0, SCREEN);
        assert_eq!(rect.origin(), Point::new(0.0, 0.0));
        assert_eq!(rect.size(), Size::new(960.0, 540.0));
    }

    #[test]
    fn test_pointer_near_far_corner_clamps_to_edge() {
        let rect = capture_rect(Point::new(1915.0, 1079.0), SURFACE, 4.0, SCREEN);
        assert_eq!(rect, Rect::new(1440.0, 810.0, 480.0, 270.0));
    }

    #[test]
    fn test_rect_always_inside_screen() {
        let pointers = [
            Point::new(-500.0, -500.0),
            Point::new(0.0, 0.0),
            Point::new(333.3, 1079.9),
            Point::new(1920.0, 0.0),
            Point::new(5000.0, 5000.0),
        ];
        let zooms = [0.5, 1.0, 1.5, 2.37, 10.0];

        for pointer in pointers {
            for zoom in zooms {
                let rect = capture_rect(pointer, SURFACE, zoom, SCREEN);
                assert!(
                    SCREEN.contains_rect(&rect),
                    "rect {:?} escapes screen for pointer {:?} zoom {}",
                    rect, pointer, zoom
                );
            }
        }
    }

    #[test]
    fn test_offset_screen_keeps_rect_on_that_screen() {
        let screen = Rect::new(-1280.0, 200.0, 1280.0, 800.0);
        let surface = Size::new(1280.0, 800.0);
        let rect = capture_rect(Point::new(-1270.0, 210.0), surface, 2.0, screen);
        assert_eq!(rect, Rect::new(-1280.0, 200.0, 640.0, 400.0));
    }

    #[test]
    fn test_hud_rect_top_center() {
        let rect = hud_rect(SCREEN, 280.0, 44.0, 20.0);
        assert_eq!(rect, Rect::new(820.0, 20.0, 280.0, 44.0));
    }
}
