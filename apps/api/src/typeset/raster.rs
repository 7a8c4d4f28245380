//! Glyph rasterization onto RGBA artwork.

use image::{Rgba, RgbaImage};

use crate::layout::font_metrics::{BitmapFont, GLYPH_CELL};
use crate::layout::TextLayout;

pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draws every line of a fitted layout. Pixels outside the image are clipped.
pub fn draw_layout(img: &mut RgbaImage, layout: &TextLayout, font: &BitmapFont, color: Rgba<u8>) {
    for line in &layout.lines {
        let left = line.center_x - line.width / 2.0;
        let top = line.center_y - layout.font_size / 2.0;
        draw_line(img, left, top, &line.text, layout.font_size, font, color);
    }
}

/// Draws one line with its top-left corner at (`left`, `top`).
pub fn draw_line(
    img: &mut RgbaImage,
    left: f32,
    top: f32,
    text: &str,
    font_size: f32,
    font: &BitmapFont,
    color: Rgba<u8>,
) {
    let cell = font_size.round().max(1.0) as i64;
    let advance = font.advance(font_size);

    for (index, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let origin_x = (left + index as f32 * advance).round() as i64;
        let origin_y = top.round() as i64;
        draw_glyph(img, origin_x, origin_y, cell, &font.glyph(ch), color);
    }
}

/// Nearest-neighbour upscale of an 8×8 glyph into a `cell`×`cell` square.
fn draw_glyph(img: &mut RgbaImage, origin_x: i64, origin_y: i64, cell: i64, rows: &[u8; 8], color: Rgba<u8>) {
    let (width, height) = (img.width() as i64, img.height() as i64);
    let native = GLYPH_CELL as i64;

    for dy in 0..cell {
        let row = rows[(dy * native / cell) as usize];
        if row == 0 {
            continue;
        }
        let py = origin_y + dy;
        if py < 0 || py >= height {
            continue;
        }
        for dx in 0..cell {
            let bit = dx * native / cell;
            if (row >> bit) & 1 == 0 {
                continue;
            }
            let px = origin_x + dx;
            if px >= 0 && px < width {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    fn inked(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[0] < 128).count()
    }

    #[test]
    fn test_draw_line_at_native_size_matches_glyph_bits() {
        let mut img = blank(16, 8);
        draw_line(&mut img, 0.0, 0.0, "A", 8.0, &BitmapFont, INK);
        let glyph = BitmapFont.glyph('A');
        let expected: u32 = glyph.iter().map(|r| r.count_ones()).sum();
        assert_eq!(inked(&img), expected as usize);
        // Nothing spills into the second cell.
        for y in 0..8 {
            for x in 8..16 {
                assert_eq!(img.get_pixel(x, y).0[0], 255);
            }
        }
    }

    #[test]
    fn test_scaled_glyph_covers_more_pixels() {
        let mut small = blank(64, 64);
        let mut large = blank(64, 64);
        draw_line(&mut small, 0.0, 0.0, "W", 8.0, &BitmapFont, INK);
        draw_line(&mut large, 0.0, 0.0, "W", 24.0, &BitmapFont, INK);
        assert_eq!(inked(&large), inked(&small) * 9);
    }

    #[test]
    fn test_drawing_is_clipped_to_image() {
        let mut img = blank(10, 10);
        draw_line(&mut img, -20.0, -4.0, "HELLO", 16.0, &BitmapFont, INK);
        draw_line(&mut img, 5.0, 5.0, "HELLO", 16.0, &BitmapFont, INK);
        assert!(inked(&img) > 0);
    }
}
