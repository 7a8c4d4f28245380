//! Bubble text fitting: picks the largest font size at which a string,
//! greedily word-wrapped, fits inside a rectangle.
//!
//! # Search
//! - Inset the box by `max(5px, 8%)` on each axis.
//! - Start at `min(inner_height, inner_width / 2, 30)` and step down 1px at a time.
//! - The first size whose wrapped block (`lines × size × 1.2`) fits the inner
//!   height wins.
//! - Nothing fits above 8px: lay out at 8px anyway and flag the overflow.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::font_metrics::TextMeasure;

pub const MAX_FONT_SIZE: f32 = 30.0;
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;
const PADDING_FRACTION: f32 = 0.08;
const MIN_PADDING: f32 = 5.0;

/// Axis-aligned rectangle in image pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One wrapped line, positioned by its center point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub lines: Vec<PlacedLine>,
    /// True when even the floor size could not fit; the block spills past the padding.
    pub overflows: bool,
}

impl TextLayout {
    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Fits `text` into `bounds`.
///
/// Returns `None` only when the box has no usable interior once padding is
/// removed. A box that is merely too small for the text still gets a
/// best-effort layout at `MIN_FONT_SIZE` with `overflows` set.
pub fn fit_text<M>(text: &str, bounds: TextBox, measure: &M) -> Option<TextLayout>
where
    M: TextMeasure + ?Sized,
{
    let padding_x = (bounds.width * PADDING_FRACTION).max(MIN_PADDING);
    let padding_y = (bounds.height * PADDING_FRACTION).max(MIN_PADDING);
    let max_width = bounds.width - padding_x * 2.0;
    let max_height = bounds.height - padding_y * 2.0;

    if max_width <= 0.0 || max_height <= 0.0 {
        return None;
    }

    let mut font_size = max_height.min(max_width / 2.0).min(MAX_FONT_SIZE);

    while font_size >= MIN_FONT_SIZE {
        let lines = wrap_words(text, font_size, max_width, measure);
        let total_height = lines.len() as f32 * font_size * LINE_HEIGHT_FACTOR;
        if total_height <= max_height {
            return Some(place_lines(lines, font_size, bounds, measure, false));
        }
        font_size -= 1.0;
    }

    debug!(
        "text does not fit {}x{} box above {}px, overflowing",
        bounds.width, bounds.height, MIN_FONT_SIZE
    );
    let lines = wrap_words(text, MIN_FONT_SIZE, max_width, measure);
    Some(place_lines(lines, MIN_FONT_SIZE, bounds, measure, true))
}

/// Greedy word wrap: keep appending words until the next one would push the
/// line past `max_width`. A single word wider than the limit gets its own line.
pub fn wrap_words<M>(text: &str, font_size: f32, max_width: f32, measure: &M) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if !line.is_empty() && measure.measure(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn place_lines<M>(
    lines: Vec<String>,
    font_size: f32,
    bounds: TextBox,
    measure: &M,
    overflows: bool,
) -> TextLayout
where
    M: TextMeasure + ?Sized,
{
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let total_height = lines.len() as f32 * line_height;
    let center_x = bounds.x + bounds.width / 2.0;
    let first_center_y = bounds.y + bounds.height / 2.0 - total_height / 2.0 + line_height / 2.0;

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedLine {
            width: measure.measure(&text, font_size),
            center_x,
            center_y: first_center_y + i as f32 * line_height,
            text,
        })
        .collect();

    TextLayout {
        font_size,
        line_height,
        lines,
        overflows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace: 10px per character at size 20, linear in size.
    fn mono(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * 10.0 * size / 20.0
    }

    fn rect(width: f32, height: f32) -> TextBox {
        TextBox {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    #[test]
    fn test_hello_world_fits_at_max_size_on_one_line() {
        let layout = fit_text("HELLO WORLD", rect(200.0, 100.0), &mono).unwrap();
        assert_eq!(layout.font_size, 30.0);
        assert_eq!(layout.line_texts(), vec!["HELLO WORLD"]);
        assert!(!layout.overflows);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let a = fit_text("HELLO WORLD", rect(200.0, 100.0), &mono).unwrap();
        let b = fit_text("HELLO WORLD", rect(200.0, 100.0), &mono).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_line_is_centered_in_box() {
        let bounds = TextBox {
            x: 40.0,
            y: 10.0,
            width: 200.0,
            height: 100.0,
        };
        let layout = fit_text("HELLO WORLD", bounds, &mono).unwrap();
        let line = &layout.lines[0];
        assert!((line.center_x - 140.0).abs() < 1e-4);
        assert!((line.center_y - 60.0).abs() < 1e-4);
        assert!((line.width - 165.0).abs() < 1e-4);
    }

    #[test]
    fn test_long_text_shrinks_to_largest_fitting_size() {
        let text = "A LONG SENTENCE THAT WRAPS SEVERAL TIMES";
        let bounds = rect(100.0, 60.0);
        let layout = fit_text(text, bounds, &mono).unwrap();

        // Inner box: 84 x 50.
        let (max_width, max_height) = (84.0, 50.0);
        assert!(layout.font_size < MAX_FONT_SIZE);
        assert!(layout.font_size >= MIN_FONT_SIZE);
        assert!(!layout.overflows);
        assert!(layout.lines.len() as f32 * layout.line_height <= max_height);

        let start = 30.0_f32.min(max_height).min(max_width / 2.0);
        let larger = layout.font_size + 1.0;
        if larger <= start {
            let lines = wrap_words(text, larger, max_width, &mono);
            assert!(lines.len() as f32 * larger * LINE_HEIGHT_FACTOR > max_height);
        }
    }

    #[test]
    fn test_lines_are_stacked_one_line_height_apart() {
        let layout = fit_text("A LONG SENTENCE THAT WRAPS SEVERAL TIMES", rect(100.0, 60.0), &mono)
            .unwrap();
        for pair in layout.lines.windows(2) {
            assert!((pair[1].center_y - pair[0].center_y - layout.line_height).abs() < 1e-3);
        }
    }

    #[test]
    fn test_overflowing_text_falls_back_to_floor_size() {
        let layout = fit_text(
            "many words here to overflow the bubble",
            rect(40.0, 30.0),
            &mono,
        )
        .unwrap();
        assert_eq!(layout.font_size, MIN_FONT_SIZE);
        assert!(layout.overflows);
        assert!(!layout.lines.is_empty());
    }

    #[test]
    fn test_start_size_below_floor_still_lays_out() {
        // Inner height is 6px, so the search never runs.
        let layout = fit_text("Hi", rect(200.0, 16.0), &mono).unwrap();
        assert_eq!(layout.font_size, MIN_FONT_SIZE);
        assert!(layout.overflows);
    }

    #[test]
    fn test_box_without_interior_is_no_fit() {
        assert!(fit_text("Hi", rect(10.0, 40.0), &mono).is_none());
        assert!(fit_text("Hi", rect(40.0, 10.0), &mono).is_none());
    }

    #[test]
    fn test_wrap_words_greedy() {
        // 5px per char at size 10, max 40px = 8 chars.
        let lines = wrap_words("ab cd efgh ijklmnopq r", 10.0, 40.0, &mono);
        assert_eq!(lines, vec!["ab cd", "efgh", "ijklmnopq", "r"]);
    }

    #[test]
    fn test_wrap_words_collapses_whitespace() {
        let lines = wrap_words("  BAM \n  POW  ", 10.0, 1000.0, &mono);
        assert_eq!(lines, vec!["BAM POW"]);
    }
}
