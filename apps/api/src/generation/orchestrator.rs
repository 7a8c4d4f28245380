//! Generation orchestrator: turns a storyboard into paginated, illustrated pages.
//!
//! Flow per panel (strictly sequential, one request in flight):
//!   reference set → prompt → artwork (≤ 3 attempts, linear backoff)
//!   → optional typesetting → progress event → pacing delay
//!
//! A panel that exhausts its attempts is recorded as failed and the run moves
//! on. Typesetting failures never fail a panel. Once every panel has been
//! reported, the full list goes through pagination.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::generation::collaborators::{ArtworkError, ArtworkGenerator, BubbleDetector};
use crate::generation::progress::ProgressEvent;
use crate::generation::prompts::build_panel_prompt;
use crate::generation::references::ReferenceImages;
use crate::layout::pagination::page_weight;
use crate::layout::paginate;
use crate::models::{
    Artwork, CustomizationData, Emphasis, GeneratedPanel, Page, Panel, TextRenderingMode,
};
use crate::typeset::cleanup::is_placeholder;
use crate::typeset::compose;

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(2000);
pub const INTER_PANEL_DELAY: Duration = Duration::from_millis(2000);
pub const MAX_PANELS: usize = 400;

/// Pacing and retry knobs for a run.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_attempts: u32,
    /// Attempt `n` failing waits `retry_base_delay * n` before attempt `n + 1`.
    pub retry_base_delay: Duration,
    /// Wait between consecutive panels, to stay under upstream rate limits.
    pub inter_panel_delay: Duration,
    /// Storyboard panels beyond this count are dropped.
    pub max_panels: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_base_delay: RETRY_BASE_DELAY,
            inter_panel_delay: INTER_PANEL_DELAY,
            max_panels: MAX_PANELS,
        }
    }
}

#[derive(Clone)]
pub struct GenerationOrchestrator {
    artwork: Arc<dyn ArtworkGenerator>,
    bubbles: Arc<dyn BubbleDetector>,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(
        artwork: Arc<dyn ArtworkGenerator>,
        bubbles: Arc<dyn BubbleDetector>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            artwork,
            bubbles,
            settings,
        }
    }

    /// Illustrates every panel in order and paginates the result.
    ///
    /// `on_progress` is called once per panel, in storyboard order, after that
    /// panel is final (including failed panels). It is never called concurrently.
    pub async fn run<F>(
        &self,
        storyboard: &[Panel],
        customization: &CustomizationData,
        mut on_progress: F,
    ) -> Vec<Page>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let panels = prepare_storyboard(
            storyboard,
            customization.force_full_page,
            self.settings.max_panels,
        );
        let total = panels.len();
        let references = ReferenceImages::from_customization(customization);
        let mode = customization.text_rendering_mode;

        info!(
            "Generating {} panels with {} (mode={:?}, references={})",
            total,
            self.artwork.model_name(),
            mode,
            references.len()
        );

        let mut generated: Vec<GeneratedPanel> = Vec::with_capacity(total);

        for (index, panel) in panels.into_iter().enumerate() {
            let result = self
                .generate_panel(panel, customization, &references, mode)
                .await;

            if result.is_failed() {
                warn!(
                    "Panel {} failed after {} attempts, continuing",
                    result.panel.panel_number, self.settings.max_attempts
                );
            }

            on_progress(ProgressEvent::new(index + 1, total, result.clone()));
            generated.push(result);

            if index + 1 < total {
                tokio::time::sleep(self.settings.inter_panel_delay).await;
            }
        }

        let pages = paginate(&generated);
        for page in &pages {
            debug!(
                "Page {}: {} panels, weight {}",
                page.page_number,
                page.panels.len(),
                page_weight(page)
            );
        }
        let failed = generated.iter().filter(|p| p.is_failed()).count();
        info!(
            "Generation finished: {} panels ({} failed) on {} pages",
            total,
            failed,
            pages.len()
        );
        pages
    }

    /// Redoes one panel's artwork with a single attempt.
    ///
    /// Uses the text-rendering mode the panel was originally generated with.
    /// The caller keeps the old artwork on error and re-paginates on success.
    pub async fn regenerate(
        &self,
        panel: &GeneratedPanel,
        customization: &CustomizationData,
    ) -> Result<GeneratedPanel, ArtworkError> {
        let mode = panel.text_rendering_mode;
        let references = ReferenceImages::from_customization(customization);
        let set = references.reference_set(&panel.panel, customization);
        let prompt = build_panel_prompt(&panel.panel, customization, mode, &set.characters);

        info!("Regenerating panel {}", panel.panel.panel_number);
        let artwork = self.artwork.generate(&prompt, &set.images).await?;
        let artwork = self.typeset(&panel.panel, artwork, mode).await;

        Ok(GeneratedPanel::succeeded(
            panel.panel.clone(),
            artwork,
            self.artwork.model_name(),
            mode,
        ))
    }

    async fn generate_panel(
        &self,
        panel: Panel,
        customization: &CustomizationData,
        references: &ReferenceImages,
        mode: TextRenderingMode,
    ) -> GeneratedPanel {
        let set = references.reference_set(&panel, customization);
        let prompt = build_panel_prompt(&panel, customization, mode, &set.characters);

        match self
            .generate_with_retry(&prompt, &set.images, panel.panel_number)
            .await
        {
            Some(artwork) => {
                let artwork = self.typeset(&panel, artwork, mode).await;
                GeneratedPanel::succeeded(panel, artwork, self.artwork.model_name(), mode)
            }
            None => GeneratedPanel::failed(panel, mode),
        }
    }

    async fn generate_with_retry(
        &self,
        prompt: &str,
        references: &[Artwork],
        panel_number: u32,
    ) -> Option<Artwork> {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            match self.artwork.generate(prompt, references).await {
                Ok(artwork) => return Some(artwork),
                Err(e) => {
                    warn!(
                        "Attempt {} for panel {} failed with {}: {}",
                        attempt,
                        panel_number,
                        self.artwork.model_name(),
                        e
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.settings.retry_base_delay * attempt).await;
                    }
                }
            }
        }
        None
    }

    /// Letters dialogue into detected bubbles. Any failure keeps the artwork as is.
    async fn typeset(&self, panel: &Panel, artwork: Artwork, mode: TextRenderingMode) -> Artwork {
        if mode != TextRenderingMode::Typeset || !has_lettering(panel) {
            return artwork;
        }

        let bubbles = match self.bubbles.detect(&artwork).await {
            Ok(bubbles) => bubbles,
            Err(e) => {
                warn!(
                    "Bubble detection failed for panel {}: {}",
                    panel.panel_number, e
                );
                return artwork;
            }
        };

        if bubbles.is_empty() {
            debug!("No bubbles detected in panel {}", panel.panel_number);
            return artwork;
        }

        let source = artwork.clone();
        let dialogue = panel.dialogue.clone();
        let monologue = panel.internal_monologue.clone();
        let lettered = tokio::task::spawn_blocking(move || {
            compose(&source, &dialogue, &monologue, &bubbles)
        })
        .await;

        match lettered {
            Ok(lettered) => lettered,
            Err(e) => {
                warn!(
                    "Typesetting task failed for panel {}: {}",
                    panel.panel_number, e
                );
                artwork
            }
        }
    }
}

fn has_lettering(panel: &Panel) -> bool {
    !is_placeholder(&panel.dialogue) || !is_placeholder(&panel.internal_monologue)
}

/// Applies the panel cap and the force-full-page override.
fn prepare_storyboard(storyboard: &[Panel], force_full_page: bool, max_panels: usize) -> Vec<Panel> {
    if storyboard.len() > max_panels {
        warn!(
            "Storyboard has {} panels, only the first {} will be generated",
            storyboard.len(),
            max_panels
        );
    }

    storyboard
        .iter()
        .take(max_panels)
        .map(|panel| {
            if force_full_page {
                Panel {
                    panel_emphasis: Emphasis::FullPage,
                    ..panel.clone()
                }
            } else {
                panel.clone()
            }
        })
        .collect()
}
