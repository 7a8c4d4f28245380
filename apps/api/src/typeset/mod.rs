// Typesetting: letters cleaned dialogue into bubbles the image model left empty.
// Best-effort end to end. Nothing in here returns an error to the pipeline.

pub mod cleanup;
pub mod compositor;
pub mod raster;

use serde::{Deserialize, Serialize};

use crate::layout::TextBox;

pub use compositor::compose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleKind {
    Speech,
    Thought,
    /// Anything else the detector reports (captions, sound effects). Never lettered.
    #[serde(other)]
    Other,
}

/// A bubble found in one panel's artwork. Lives only as long as the compositing
/// step that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    #[serde(rename = "type")]
    pub kind: BubbleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bubble {
    pub fn bounds(&self) -> TextBox {
        TextBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubble_parses_detector_output() {
        let bubbles: Vec<Bubble> = serde_json::from_str(
            r#"[{"type":"speech","x":10,"y":20,"width":120,"height":60},
                {"type":"caption","x":0,"y":0,"width":50,"height":10}]"#,
        )
        .unwrap();
        assert_eq!(bubbles[0].kind, BubbleKind::Speech);
        assert_eq!(bubbles[0].bounds().width, 120.0);
        assert_eq!(bubbles[1].kind, BubbleKind::Other);
    }
}
