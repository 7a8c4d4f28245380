use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::artwork::Artwork;
use crate::models::panel::TextRenderingMode;

/// Normalized character key: lowercased, whitespace runs collapsed to `_`.
///
/// "Captain  Vega" and "captain vega" map to the same key, so a storyboard that
/// spells a name slightly differently still finds the character's references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn from_name(name: &str) -> Self {
        let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
        CharacterId(joined.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
    /// User-supplied reference image as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image_url: Option<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            reference_image_url: None,
        }
    }

    pub fn id(&self) -> CharacterId {
        CharacterId::from_name(&self.name)
    }

    /// The pinned reference image, if one was uploaded and is well-formed.
    pub fn reference_image(&self) -> Option<Artwork> {
        self.reference_image_url
            .as_deref()
            .and_then(Artwork::from_data_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualStyle {
    pub id: String,
    pub name: String,
    pub prompt: String,
}

impl VisualStyle {
    /// Realistic styles are framed as film stills rather than comic panels.
    pub fn is_realistic(&self) -> bool {
        self.id.contains("realism") || self.id.contains("photo")
    }
}

/// Everything the user chose on the customization screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomizationData {
    pub style: VisualStyle,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub text_rendering_mode: TextRenderingMode,
    /// Put every panel on its own page regardless of storyboard emphasis.
    #[serde(default)]
    pub force_full_page: bool,
}

impl CustomizationData {
    /// Finds the customization entry for a storyboard name via its normalized key.
    pub fn character_named(&self, name: &str) -> Option<&Character> {
        let wanted = CharacterId::from_name(name);
        self.characters.iter().find(|c| c.id() == wanted)
    }
}

const STYLE_TABLE: [(&str, &str, &str); 8] = [
    (
        "american_superhero",
        "American Superhero",
        "A vibrant, dynamic digital illustration in the style of modern American superhero comics, with bold lines, dramatic shading, and a cinematic feel.",
    ),
    (
        "classic_manga",
        "Classic Manga",
        "A black and white illustration in the style of classic Shonen manga, with clean lines, expressive characters, screentones for shading, and dynamic action poses.",
    ),
    (
        "gritty_noir",
        "Gritty Noir",
        "A high-contrast, black and white illustration in the style of gritty noir comics, with heavy shadows, stark lighting, and a sense of mystery and suspense. Use of chiaroscuro is prominent.",
    ),
    (
        "whimsical_cartoon",
        "Whimsical Cartoon",
        "A colorful, friendly digital illustration in a whimsical cartoon style, with soft shapes, bright colors, and expressive, friendly characters, suitable for all ages.",
    ),
    (
        "watercolor",
        "Watercolor",
        "A beautiful, flowing illustration with the texture and feel of a watercolor painting, with soft edges, blended colors, and an artistic, slightly ethereal quality.",
    ),
    (
        "photorealism",
        "Photorealism",
        "A highly detailed, photorealistic image with cinematic lighting and textures, resembling a high-resolution photograph from a movie.",
    ),
    (
        "cinematic_realism",
        "Cinematic Realism",
        "A hyper-realistic image styled as a cinematic shot from a modern film, with dramatic lighting, shallow depth of field, and rich, moody colors. The composition should feel intentional and movie-like.",
    ),
    (
        "3d_realistic",
        "3D Realistic",
        "A high-quality, realistic 3D render. The style should be similar to modern 3D video games or visual novels, with detailed character models, realistic textures, and cinematic lighting. Emphasize realism but within a 3D rendered aesthetic.",
    ),
];

/// The built-in visual style catalogue, in display order.
pub fn visual_styles() -> Vec<VisualStyle> {
    STYLE_TABLE
        .iter()
        .map(|(id, name, prompt)| VisualStyle {
            id: id.to_string(),
            name: name.to_string(),
            prompt: prompt.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_lowercases_and_collapses_whitespace() {
        assert_eq!(CharacterId::from_name("Captain  Vega").as_str(), "captain_vega");
        assert_eq!(
            CharacterId::from_name(" captain\tvega "),
            CharacterId::from_name("Captain Vega")
        );
    }

    #[test]
    fn test_reference_image_requires_data_url() {
        let mut mira = Character::new("Mira", "Tall courier with a red scarf");
        assert!(mira.reference_image().is_none());

        mira.reference_image_url = Some("data:image/jpeg;base64,QUJD".to_string());
        let art = mira.reference_image().unwrap();
        assert_eq!(art.mime_type, "image/jpeg");
        assert_eq!(art.data, "QUJD");

        mira.reference_image_url = Some("https://example.com/mira.jpg".to_string());
        assert!(mira.reference_image().is_none());
    }

    #[test]
    fn test_character_named_matches_normalized_name() {
        let custom = CustomizationData {
            style: visual_styles().remove(0),
            characters: vec![Character::new("Old Tom", "Grizzled fisherman")],
            text_rendering_mode: TextRenderingMode::Overlay,
            force_full_page: false,
        };
        assert!(custom.character_named("old  tom").is_some());
        assert!(custom.character_named("Tom").is_none());
    }

    #[test]
    fn test_style_catalogue_realism_flags() {
        let styles = visual_styles();
        assert_eq!(styles.len(), 8);
        let realistic: Vec<&str> = styles
            .iter()
            .filter(|s| s.is_realistic())
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(realistic, vec!["photorealism", "cinematic_realism"]);
    }
}
