// paint.rs - Software Drawing Primitives
//
// Small helpers for drawing into RGBA pixel buffers. Colors are straight
// (non-premultiplied) RGBA and are blended source-over onto the target.

use image::{Rgba, RgbaImage};

/// Blend `color` over the pixel at (x, y). Out-of-bounds writes are ignored.
pub fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: [u8; 4]) {
    blend_pixel_coverage(image, x, y, color, 1.0);
}

/// Blend `color` scaled by `coverage` (0..=1) over the pixel at (x, y)
pub fn blend_pixel_coverage(image: &mut RgbaImage, x: i32, y: i32, color: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }

    let src_a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = image.get_pixel_mut(x as u32, y as u32);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let src = color[c] as f32 / 255.0;
        let d = dst[c] as f32 / 255.0;
        let v = (src * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        out[c] = (v * 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

/// Fill an axis-aligned rectangle
pub fn fill_rect(image: &mut RgbaImage, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
    for py in y..y + height {
        for px in x..x + width {
            blend_pixel(image, px, py, color);
        }
    }
}

/// Coverage of a pixel center by a rounded rectangle, with a one-pixel
/// anti-aliased edge.
fn rounded_coverage(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, r: f32) -> f32 {
    let cx = px.clamp(x + r, x + w - r);
    let cy = py.clamp(y + r, y + h - r);
    let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    (r - dist + 0.5).clamp(0.0, 1.0)
}

/// Fill a rounded rectangle with anti-aliased corners
pub fn fill_rounded_rect(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    radius: f32,
    color: [u8; 4],
) {
    let r = radius.min(width as f32 / 2.0).min(height as f32 / 2.0).max(0.0);
    for py in y..y + height {
        for px in x..x + width {
            let coverage = rounded_coverage(
                px as f32 + 0.5,
                py as f32 + 0.5,
                x as f32,
                y as f32,
                width as f32,
                height as f32,
                r,
            );
            blend_pixel_coverage(image, px, py, color, coverage);
        }
    }
}

/// Stroke the outline of a rounded rectangle with a one-pixel line
pub fn stroke_rounded_rect(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    radius: f32,
    color: [u8; 4],
) {
    let r = radius.min(width as f32 / 2.0).min(height as f32 / 2.0).max(0.0);
    for py in y..y + height {
        for px in x..x + width {
            let fx = px as f32 + 0.5;
            let fy = py as f32 + 0.5;
            let outer = rounded_coverage(fx, fy, x as f32, y as f32, width as f32, height as f32, r);
            let inner = rounded_coverage(
                fx,
                fy,
                x as f32 + 1.0,
                y as f32 + 1.0,
                width as f32 - 2.0,
                height as f32 - 2.0,
                (r - 1.0).max(0.0),
            );
            blend_pixel_coverage(image, px, py, color, outer - inner);
        }
    }
}
