//! Page packing: groups an ordered panel sequence into numbered pages.
//!
//! Every page has a capacity of `MAX_PAGE_WEIGHT`. Panels are walked in
//! storyboard order and never reordered; pagination only decides where page
//! breaks fall.
//!
//! # Rules
//! - A panel whose weight reaches the cap (FULL_PAGE) always sits alone.
//! - A panel that would push the running weight *over* the cap starts a new page.
//! - Landing exactly on the cap is fine.

use crate::models::{Emphasis, GeneratedPanel, Page, Panel};

pub const MAX_PAGE_WEIGHT: u8 = 6;

/// Page capacity consumed by a panel of the given emphasis.
pub const fn weight(emphasis: Emphasis) -> u8 {
    match emphasis {
        Emphasis::Normal => 1,
        Emphasis::Wide => 2,
        Emphasis::Tall => 2,
        Emphasis::FullPage => MAX_PAGE_WEIGHT,
    }
}

/// Anything that carries a layout emphasis can be paginated.
pub trait Weighted {
    fn emphasis(&self) -> Emphasis;
}

impl Weighted for Panel {
    fn emphasis(&self) -> Emphasis {
        self.panel_emphasis
    }
}

impl Weighted for GeneratedPanel {
    fn emphasis(&self) -> Emphasis {
        self.panel.panel_emphasis
    }
}

/// Packs panels into pages. Pure: the same input always yields the same pages.
pub fn paginate<P: Weighted + Clone>(panels: &[P]) -> Vec<Page<P>> {
    let mut groups: Vec<Vec<P>> = Vec::new();
    let mut current: Vec<P> = Vec::new();
    let mut current_weight = 0u8;

    for panel in panels {
        let panel_weight = weight(panel.emphasis());

        if panel_weight >= MAX_PAGE_WEIGHT {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            groups.push(vec![panel.clone()]);
            current_weight = 0;
            continue;
        }

        if current_weight + panel_weight > MAX_PAGE_WEIGHT {
            groups.push(std::mem::take(&mut current));
            current.push(panel.clone());
            current_weight = panel_weight;
        } else {
            current.push(panel.clone());
            current_weight += panel_weight;
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, panels)| Page {
            page_number: index as u32 + 1,
            panels,
        })
        .collect()
}

/// Total weight of a page's panels.
pub fn page_weight<P: Weighted>(page: &Page<P>) -> u32 {
    page.panels
        .iter()
        .map(|p| weight(p.emphasis()) as u32)
        .sum()
}
