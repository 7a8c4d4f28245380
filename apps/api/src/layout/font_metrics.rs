//! Font metrics used when fitting lettering into bubbles.
//!
//! The fitter only needs one question answered: how wide is this string at this
//! size? `TextMeasure` is that question. The production answer is
//! `BitmapFont`, the same 8×8 glyph set the rasterizer draws with, so a line
//! that measures as fitting is drawn exactly that wide.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

/// Width provider for the text fitter. Widths are in pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> f32,
{
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

/// Native cell size of the bundled glyphs, in pixels.
pub const GLYPH_CELL: u32 = 8;

/// Monospace 8×8 bitmap lettering, scaled so one glyph cell is `font_size` px square.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    /// Row bitmaps for a character. Unknown characters render as `?`.
    pub fn glyph(&self, ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }

    /// Horizontal advance of one glyph at the given size.
    pub fn advance(&self, font_size: f32) -> f32 {
        font_size
    }
}

impl TextMeasure for BitmapFont {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.advance(font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        assert_eq!(BitmapFont.measure("", 20.0), 0.0);
    }

    #[test]
    fn test_measure_scales_linearly_with_size() {
        let at_ten = BitmapFont.measure("POW!", 10.0);
        let at_twenty = BitmapFont.measure("POW!", 20.0);
        assert!((at_ten - 40.0).abs() < 1e-4);
        assert!((at_twenty - 2.0 * at_ten).abs() < 1e-4);
    }

    #[test]
    fn test_measure_counts_chars_not_bytes() {
        assert_eq!(BitmapFont.measure("é", 8.0), BitmapFont.measure("e", 8.0));
    }

    #[test]
    fn test_glyph_fallback_for_unknown_char() {
        let font = BitmapFont;
        assert_eq!(font.glyph('\u{2603}'), font.glyph('?'));
        assert_ne!(font.glyph('A'), [0; 8]);
        assert_eq!(font.glyph(' '), [0; 8]);
    }

    #[test]
    fn test_closures_are_measurers() {
        let fixed = |text: &str, size: f32| text.len() as f32 * size * 0.5;
        assert!((fixed.measure("HELLO", 20.0) - 50.0).abs() < 1e-4);
    }
}
