//! Character reference images for cross-panel consistency.
//!
//! `ReferenceImages` is built once from the customization at the start of a
//! run and is read-only afterwards. Generated artwork is never fed back into it.

use std::collections::{HashMap, HashSet};

use crate::models::{Artwork, CharacterId, CustomizationData, Panel};

#[derive(Debug, Clone, Default)]
pub struct ReferenceImages {
    by_character: HashMap<CharacterId, Artwork>,
}

/// What gets attached to one panel's request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    /// Distinct images, in first-use order.
    pub images: Vec<Artwork>,
    /// Characters covered by an attached image, in panel order.
    pub characters: Vec<String>,
}

impl ReferenceImages {
    pub fn from_customization(customization: &CustomizationData) -> Self {
        let by_character = customization
            .characters
            .iter()
            .filter_map(|c| c.reference_image().map(|art| (c.id(), art)))
            .collect();
        Self { by_character }
    }

    pub fn get(&self, id: &CharacterId) -> Option<&Artwork> {
        self.by_character.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_character.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_character.is_empty()
    }

    /// Collects the reference images for the characters present in `panel`.
    ///
    /// Characters repeated in the panel are counted once. Two characters
    /// pinned to byte-identical images share a single attachment but are both
    /// named as referenced.
    pub fn reference_set(&self, panel: &Panel, customization: &CustomizationData) -> ReferenceSet {
        let mut set = ReferenceSet::default();
        let mut seen_characters: HashSet<CharacterId> = HashSet::new();
        let mut seen_images: HashSet<&str> = HashSet::new();

        for name in &panel.characters {
            let id = CharacterId::from_name(name);
            if !seen_characters.insert(id.clone()) {
                continue;
            }
            let Some(image) = self.get(&id) else {
                continue;
            };

            if seen_images.insert(image.data.as_str()) {
                set.images.push(image.clone());
            }
            let display_name = customization
                .character_named(name)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| name.clone());
            set.characters.push(display_name);
        }

        set
    }
}
