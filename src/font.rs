// font.rs - Tiny Bitmap Font
//
// A 5x7 pixel font covering the characters the HUD needs. Each glyph is
// seven rows, the low five bits of each row are the pixels, MSB on the left.

use image::RgbaImage;

use crate::paint::blend_pixel;

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character, in font pixels
const ADVANCE: i32 = GLYPH_WIDTH + 1;

fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'S' => [0x0E, 0x11, 0x10, 0x0E, 0x01, 0x11, 0x0E],
        'c' => [0x00, 0x00, 0x0E, 0x11, 0x10, 0x11, 0x0E],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0F, 0x10, 0x0E, 0x01, 0x1E],
        't' => [0x08, 0x08, 0x1E, 0x08, 0x08, 0x09, 0x06],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        '↕' => [0x04, 0x0E, 0x15, 0x04, 0x15, 0x0E, 0x04],
        _ => return None,
    };
    Some(rows)
}

/// Width in image pixels of `text` drawn at `scale`
pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    (count * ADVANCE - 1) * scale
}

/// Height in image pixels of a line drawn at `scale`
pub fn line_height(scale: i32) -> i32 {
    GLYPH_HEIGHT * scale
}

/// Draw `text` with its top-left corner at (x, y). Characters without a
/// glyph advance like a space.
pub fn draw_text(image: &mut RgbaImage, x: i32, y: i32, text: &str, color: [u8; 4], scale: i32) {
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        let px = pen_x + col * scale;
                        let py = y + row as i32 * scale;
                        for sy in 0..scale {
                            for sx in 0..scale {
                                blend_pixel(image, px + sx, py + sy, color);
                            }
                        }
                    }
                }
            }
        }
        pen_x += ADVANCE * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_strings_have_glyphs() {
        for text in ["ESC", "to exit", "scroll ↕", "0123456789.x"] {
            for ch in text.chars().filter(|c| *c != ' ') {
                assert!(glyph(ch).is_some(), "missing glyph for {:?}", ch);
            }
        }
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("ESC", 1), 17);
        assert_eq!(text_width("2.0x", 2), 46);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut image = RgbaImage::new(20, 10);
        draw_text(&mut image, 0, 0, "1", [255, 255, 255, 255], 1);
        // Top row of '1' is a single pixel in the middle column
        assert_eq!(image.get_pixel(2, 0).0[3], 255);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }
}
