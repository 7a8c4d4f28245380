use serde::{Deserialize, Serialize};

use crate::models::artwork::Artwork;

/// Layout-weight hint attached to every panel by story analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Emphasis {
    #[default]
    Normal,
    /// Takes the full width of a row.
    Wide,
    /// Spans multiple rows vertically.
    Tall,
    /// Takes the entire page.
    FullPage,
}

/// How dialogue reaches the finished panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRenderingMode {
    /// No text in the artwork; the viewer overlays it.
    #[default]
    Overlay,
    /// The image model letters the bubbles itself.
    InImage,
    /// The image model draws empty bubbles and we typeset into them.
    Typeset,
}

/// One narrative beat, exactly as the story-analysis collaborator emits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// 1-based position in the storyboard. Stable for the life of the comic.
    pub panel_number: u32,
    pub setting: String,
    #[serde(default)]
    pub characters: Vec<String>,
    pub action: String,
    #[serde(default)]
    pub dialogue: String,
    #[serde(default)]
    pub internal_monologue: String,
    #[serde(default)]
    pub panel_emphasis: Emphasis,
}

/// Which model produced a panel's artwork, or the `failed` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeneratedBy {
    Model(String),
    Failed,
}

const FAILED_TAG: &str = "failed";

impl From<String> for GeneratedBy {
    fn from(tag: String) -> Self {
        if tag == FAILED_TAG {
            GeneratedBy::Failed
        } else {
            GeneratedBy::Model(tag)
        }
    }
}

impl From<GeneratedBy> for String {
    fn from(tag: GeneratedBy) -> Self {
        match tag {
            GeneratedBy::Model(model) => model,
            GeneratedBy::Failed => FAILED_TAG.to_string(),
        }
    }
}

/// A panel plus the outcome of generating its artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPanel {
    #[serde(flatten)]
    pub panel: Panel,
    /// `None` when generation failed.
    pub image: Option<Artwork>,
    pub generated_by: GeneratedBy,
    pub text_rendering_mode: TextRenderingMode,
}

impl GeneratedPanel {
    pub fn succeeded(
        panel: Panel,
        image: Artwork,
        model: impl Into<String>,
        mode: TextRenderingMode,
    ) -> Self {
        Self {
            panel,
            image: Some(image),
            generated_by: GeneratedBy::Model(model.into()),
            text_rendering_mode: mode,
        }
    }

    pub fn failed(panel: Panel, mode: TextRenderingMode) -> Self {
        Self {
            panel,
            image: None,
            generated_by: GeneratedBy::Failed,
            text_rendering_mode: mode,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.generated_by == GeneratedBy::Failed
    }
}

/// A group of panels sharing one printed page.
///
/// `page_number` is assigned by pagination and only meaningful within the run
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<P = GeneratedPanel> {
    pub page_number: u32,
    pub panels: Vec<P>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_wire_names() {
        let parsed: Vec<Emphasis> =
            serde_json::from_str(r#"["NORMAL","WIDE","TALL","FULL_PAGE"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Emphasis::Normal,
                Emphasis::Wide,
                Emphasis::Tall,
                Emphasis::FullPage
            ]
        );
    }

    #[test]
    fn test_unknown_emphasis_is_rejected() {
        assert!(serde_json::from_str::<Emphasis>(r#""HUGE""#).is_err());
    }

    #[test]
    fn test_text_rendering_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&TextRenderingMode::InImage).unwrap(),
            r#""in_image""#
        );
        assert_eq!(
            serde_json::from_str::<TextRenderingMode>(r#""typeset""#).unwrap(),
            TextRenderingMode::Typeset
        );
    }

    #[test]
    fn test_generated_by_failed_sentinel() {
        assert_eq!(
            serde_json::to_string(&GeneratedBy::Failed).unwrap(),
            r#""failed""#
        );
        let tag: GeneratedBy = serde_json::from_str(r#""gemini-2.5-flash-image-preview""#).unwrap();
        assert_eq!(
            tag,
            GeneratedBy::Model("gemini-2.5-flash-image-preview".to_string())
        );
    }

    #[test]
    fn test_generated_panel_flattens_storyboard_fields() {
        let panel = Panel {
            panel_number: 3,
            setting: "Rooftop".to_string(),
            characters: vec!["Mira".to_string()],
            action: "Mira leaps.".to_string(),
            dialogue: "Mira: Now!".to_string(),
            internal_monologue: "None".to_string(),
            panel_emphasis: Emphasis::Wide,
        };
        let generated = GeneratedPanel::failed(panel, TextRenderingMode::Overlay);
        let value = serde_json::to_value(&generated).unwrap();
        assert_eq!(value["panel_number"], 3);
        assert_eq!(value["panel_emphasis"], "WIDE");
        assert_eq!(value["generated_by"], "failed");
        assert!(value["image"].is_null());
        assert!(generated.is_failed());
    }
}
