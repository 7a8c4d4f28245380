//! User edits to an already-paginated comic.
//!
//! An edit never mutates a panel in place: it builds a new panel value, swaps it
//! into the flattened panel list, and re-runs pagination, since a changed
//! emphasis can move every page break after it.

use serde::Deserialize;

use crate::layout::pagination::paginate;
use crate::models::{Emphasis, GeneratedPanel, Page, Panel};

/// Fields a user may change from the edit dialog. `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelEdit {
    pub setting: Option<String>,
    pub action: Option<String>,
    pub dialogue: Option<String>,
    pub internal_monologue: Option<String>,
    pub characters: Option<Vec<String>>,
    pub panel_emphasis: Option<Emphasis>,
}

impl PanelEdit {
    pub fn apply(&self, panel: &Panel) -> Panel {
        Panel {
            panel_number: panel.panel_number,
            setting: self.setting.clone().unwrap_or_else(|| panel.setting.clone()),
            characters: self
                .characters
                .clone()
                .unwrap_or_else(|| panel.characters.clone()),
            action: self.action.clone().unwrap_or_else(|| panel.action.clone()),
            dialogue: self.dialogue.clone().unwrap_or_else(|| panel.dialogue.clone()),
            internal_monologue: self
                .internal_monologue
                .clone()
                .unwrap_or_else(|| panel.internal_monologue.clone()),
            panel_emphasis: self.panel_emphasis.unwrap_or(panel.panel_emphasis),
        }
    }
}

/// Flattens pages back into storyboard order.
pub fn flatten_pages(pages: &[Page]) -> Vec<GeneratedPanel> {
    pages.iter().flat_map(|p| p.panels.iter().cloned()).collect()
}

/// Swaps in a replacement for the panel with the same `panel_number` and
/// re-paginates. Returns `None` if no such panel exists.
pub fn replace_panel(pages: &[Page], updated: GeneratedPanel) -> Option<Vec<Page>> {
    let mut panels = flatten_pages(pages);
    let slot = panels
        .iter_mut()
        .find(|p| p.panel.panel_number == updated.panel.panel_number)?;
    *slot = updated;
    Some(paginate(&panels))
}

/// Applies a text/emphasis edit to one panel and re-paginates.
pub fn apply_panel_edit(pages: &[Page], panel_number: u32, edit: &PanelEdit) -> Option<Vec<Page>> {
    let current = pages
        .iter()
        .flat_map(|p| p.panels.iter())
        .find(|p| p.panel.panel_number == panel_number)?;

    let updated = GeneratedPanel {
        panel: edit.apply(&current.panel),
        ..current.clone()
    };
    replace_panel(pages, updated)
}
