//! Axum route handlers for the comic API.

use axum::{
    extract::State,
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::generation::progress::ProgressEvent;
use crate::layout::editing::{apply_panel_edit, replace_panel, PanelEdit};
use crate::layout::paginate;
use crate::models::character::visual_styles;
use crate::models::{CustomizationData, GeneratedPanel, Page, Panel, VisualStyle};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub styles: Vec<VisualStyle>,
}

#[derive(Debug, Deserialize)]
pub struct PaginateRequest {
    pub panels: Vec<GeneratedPanel>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub storyboard: Vec<Panel>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub pages: Vec<Page<Panel>>,
}

#[derive(Debug, Serialize)]
pub struct PagesResponse {
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub storyboard: Vec<Panel>,
    pub customization: CustomizationData,
}

/// Final SSE event of a run.
#[derive(Debug, Serialize)]
pub struct GenerationComplete {
    pub run_id: Uuid,
    pub pages: Vec<Page>,
    /// Panels that exhausted their attempts, for the UI's regenerate buttons.
    pub failed_panels: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EditPanelRequest {
    pub pages: Vec<Page>,
    pub panel_number: u32,
    pub edit: PanelEdit,
}

#[derive(Debug, Deserialize)]
pub struct RegeneratePanelRequest {
    pub pages: Vec<Page>,
    pub panel_number: u32,
    pub customization: CustomizationData,
}

#[derive(Debug, Serialize)]
pub struct RegeneratePanelResponse {
    pub panel: GeneratedPanel,
    pub pages: Vec<Page>,
}

enum RunEvent {
    Progress(ProgressEvent),
    Complete(GenerationComplete),
}

impl RunEvent {
    fn into_sse(self) -> Result<Event, axum::Error> {
        match self {
            RunEvent::Progress(progress) => Event::default().event("progress").json_data(progress),
            RunEvent::Complete(complete) => Event::default().event("complete").json_data(complete),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/styles
pub async fn handle_list_styles() -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: visual_styles(),
    })
}

/// POST /api/v1/comics/paginate
///
/// Packs panels into pages. Pure; no credentials needed.
pub async fn handle_paginate(Json(request): Json<PaginateRequest>) -> Json<PagesResponse> {
    Json(PagesResponse {
        pages: paginate(&request.panels),
    })
}

/// POST /api/v1/storyboard/paginate
///
/// Layout preview: packs storyboard panels into pages before any artwork exists.
pub async fn handle_preview_layout(Json(request): Json<PreviewRequest>) -> Json<PreviewResponse> {
    Json(PreviewResponse {
        pages: paginate(&request.storyboard),
    })
}

/// POST /api/v1/comics/generate
///
/// Runs the full generation pipeline and streams it as Server-Sent Events:
/// one `progress` event per panel in storyboard order, then one `complete`
/// event carrying the pages. Closing the stream abandons the run.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    if request.storyboard.is_empty() {
        return Err(AppError::Validation("storyboard cannot be empty".to_string()));
    }
    let gemini = state.gemini_for(&headers)?;
    let orchestrator = state.orchestrator(gemini);

    let run_id = Uuid::new_v4();
    info!(
        "Starting generation run {run_id} ({} panels)",
        request.storyboard.len()
    );

    let rx = spawn_run(orchestrator, request, run_id);
    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((event.into_sse(), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Runs the pipeline on its own task and returns its event feed.
///
/// Progress events arrive in storyboard order, followed by exactly one
/// `Complete`. Dropping the receiver abandons the run at its next wait.
fn spawn_run(
    orchestrator: GenerationOrchestrator,
    request: GenerateRequest,
    run_id: Uuid,
) -> mpsc::UnboundedReceiver<RunEvent> {
    let (tx, rx) = mpsc::unbounded_channel::<RunEvent>();

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let run = orchestrator.run(
            &request.storyboard,
            &request.customization,
            move |event| {
                let _ = progress_tx.send(RunEvent::Progress(event));
            },
        );

        let pages = tokio::select! {
            pages = run => Some(pages),
            _ = tx.closed() => None,
        };

        match pages {
            Some(pages) => {
                let failed_panels = pages
                    .iter()
                    .flat_map(|p| p.panels.iter())
                    .filter(|p| p.is_failed())
                    .map(|p| p.panel.panel_number)
                    .collect();
                info!("Generation run {run_id} complete");
                let _ = tx.send(RunEvent::Complete(GenerationComplete {
                    run_id,
                    pages,
                    failed_panels,
                }));
            }
            None => warn!("Client disconnected, abandoning generation run {run_id}"),
        }
    });

    rx
}

/// POST /api/v1/comics/edit
///
/// Applies a user edit to one panel and re-paginates the comic.
pub async fn handle_edit_panel(
    Json(request): Json<EditPanelRequest>,
) -> Result<Json<PagesResponse>, AppError> {
    let pages = apply_panel_edit(&request.pages, request.panel_number, &request.edit)
        .ok_or_else(|| panel_not_found(request.panel_number))?;

    Ok(Json(PagesResponse { pages }))
}

/// POST /api/v1/panels/regenerate
///
/// Redoes one panel's artwork (single attempt) and re-paginates. On failure
/// the caller keeps its current pages.
pub async fn handle_regenerate_panel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegeneratePanelRequest>,
) -> Result<Json<RegeneratePanelResponse>, AppError> {
    let current = request
        .pages
        .iter()
        .flat_map(|p| p.panels.iter())
        .find(|p| p.panel.panel_number == request.panel_number)
        .ok_or_else(|| panel_not_found(request.panel_number))?;

    let gemini = state.gemini_for(&headers)?;
    let panel = state
        .orchestrator(gemini)
        .regenerate(current, &request.customization)
        .await
        .map_err(|e| {
            AppError::Generation(format!(
                "Failed to regenerate panel {}: {e}",
                request.panel_number
            ))
        })?;

    let pages = replace_panel(&request.pages, panel.clone())
        .ok_or_else(|| panel_not_found(request.panel_number))?;

    Ok(Json(RegeneratePanelResponse { panel, pages }))
}

fn panel_not_found(panel_number: u32) -> AppError {
    AppError::NotFound(format!("Panel {panel_number} not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::gemini_client::GeminiError;
    use crate::generation::collaborators::{ArtworkError, ArtworkGenerator, BubbleDetector};
    use crate::generation::orchestrator::GenerationSettings;
    use crate::models::{Artwork, Emphasis, TextRenderingMode};
    use crate::typeset::Bubble;

    /// Fails every prompt for the given setting; counts calls.
    struct CountingArtwork {
        failing_setting: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArtworkGenerator for CountingArtwork {
        fn model_name(&self) -> &str {
            "stub-model"
        }

        async fn generate(&self, prompt: &str, _references: &[Artwork]) -> Result<Artwork, ArtworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failing_setting
                .is_some_and(|setting| prompt.contains(&format!("Setting: {setting}")));
            if failing {
                return Err(GeminiError::NoImage.into());
            }
            Ok(Artwork::new("image/png", "cGFuZWw="))
        }
    }

    struct NoBubbles;

    #[async_trait]
    impl BubbleDetector for NoBubbles {
        async fn detect(&self, _artwork: &Artwork) -> Result<Vec<Bubble>, ArtworkError> {
            Ok(Vec::new())
        }
    }

    fn panel(number: u32, setting: &str) -> Panel {
        Panel {
            panel_number: number,
            setting: setting.to_string(),
            characters: vec![],
            action: "Waves.".to_string(),
            dialogue: "None".to_string(),
            internal_monologue: "None".to_string(),
            panel_emphasis: Emphasis::Normal,
        }
    }

    fn request(storyboard: Vec<Panel>) -> GenerateRequest {
        GenerateRequest {
            storyboard,
            customization: CustomizationData {
                style: visual_styles().remove(0),
                characters: vec![],
                text_rendering_mode: TextRenderingMode::Overlay,
                force_full_page: false,
            },
        }
    }

    fn orchestrator(artwork: &Arc<CountingArtwork>) -> GenerationOrchestrator {
        GenerationOrchestrator::new(artwork.clone(), Arc::new(NoBubbles), GenerationSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_emits_progress_in_order_then_one_complete() {
        let artwork = Arc::new(CountingArtwork {
            failing_setting: Some("Alley"),
            calls: AtomicUsize::new(0),
        });
        let run_id = Uuid::new_v4();
        let mut rx = spawn_run(
            orchestrator(&artwork),
            request(vec![panel(1, "Harbor"), panel(2, "Alley")]),
            run_id,
        );

        match rx.recv().await {
            Some(RunEvent::Progress(event)) => {
                assert_eq!((event.current, event.total), (1, 2));
                assert!(!event.panel.is_failed());
            }
            _ => panic!("expected progress for panel 1"),
        }
        match rx.recv().await {
            Some(RunEvent::Progress(event)) => {
                assert_eq!((event.current, event.total), (2, 2));
                assert!(event.panel.is_failed());
            }
            _ => panic!("expected progress for panel 2"),
        }
        match rx.recv().await {
            Some(RunEvent::Complete(complete)) => {
                assert_eq!(complete.run_id, run_id);
                assert_eq!(complete.failed_panels, vec![2]);
                assert_eq!(complete.pages.len(), 1);
                assert_eq!(complete.pages[0].panels.len(), 2);
            }
            _ => panic!("expected complete event"),
        }
        assert!(rx.recv().await.is_none());
        assert_eq!(artwork.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_receiver_abandons_run() {
        let artwork = Arc::new(CountingArtwork {
            failing_setting: None,
            calls: AtomicUsize::new(0),
        });
        let mut rx = spawn_run(
            orchestrator(&artwork),
            request(vec![panel(1, "Harbor"), panel(2, "Dock"), panel(3, "Pier")]),
            Uuid::new_v4(),
        );

        assert!(matches!(rx.recv().await, Some(RunEvent::Progress(_))));
        drop(rx);

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(artwork.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_complete_event_serializes() {
        let complete = RunEvent::Complete(GenerationComplete {
            run_id: Uuid::nil(),
            pages: vec![],
            failed_panels: vec![],
        });
        assert!(complete.into_sse().is_ok());
    }
}
