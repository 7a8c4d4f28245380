pub mod artwork;
pub mod character;
pub mod panel;

pub use artwork::Artwork;
pub use character::{Character, CharacterId, CustomizationData, VisualStyle};
pub use panel::{Emphasis, GeneratedBy, GeneratedPanel, Page, Panel, TextRenderingMode};
