// crosshair.rs - Crosshair Glyph
//
// Two perpendicular strokes marking the pointer position at the center of
// the magnified image. Each stroke is a wide dark outline under a narrower
// light line so it stays visible on any background.

use image::RgbaImage;

use crate::constants::{colors, crosshair};
use crate::paint::blend_pixel;

/// A rasterized crosshair ready to be composited over the overlay surface
#[derive(Debug, Clone)]
pub struct Crosshair {
    image: RgbaImage,
}

impl Crosshair {
    /// Rasterize the crosshair for a surface with `pixel_scale` pixels per
    /// point.
    pub fn new(pixel_scale: u32) -> Self {
        let s = pixel_scale.max(1) as i32;
        let arm = crosshair::ARM as i32 * s;
        let outline = crosshair::OUTLINE_WIDTH as i32 * s;
        let line = crosshair::LINE_WIDTH as i32 * s;

        let side = (2 * arm + outline) as u32;
        let mut image = RgbaImage::new(side, side);
        let center = side as i32 / 2;

        stroke_cross(&mut image, center, arm, outline, colors::CROSSHAIR_OUTLINE);
        stroke_cross(&mut image, center, arm, line, colors::CROSSHAIR_LINE);

        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Blend a plus sign of stroke `width` once per pixel so the overlapping
/// center is not darkened twice.
fn stroke_cross(image: &mut RgbaImage, center: i32, arm: i32, width: i32, color: [u8; 4]) {
    let half = width / 2;
    let (w, h) = image.dimensions();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let horizontal = (center - arm..center + arm).contains(&x)
                && (center - half..center - half + width).contains(&y);
            let vertical = (center - half..center - half + width).contains(&x)
                && (center - arm..center + arm).contains(&y);
            if horizontal || vertical {
                blend_pixel(image, x, y, color);
            }
        }
    }
}
