use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::Config;
use crate::errors::AppError;
use crate::gemini_client::GeminiClient;
use crate::generation::orchestrator::{GenerationOrchestrator, GenerationSettings};

/// Per-request credential header. Wins over `GEMINI_API_KEY`.
pub const API_KEY_HEADER: &str = "x-gemini-api-key";

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built from `GEMINI_API_KEY` at startup; `None` when the server has no key.
    pub gemini: Option<GeminiClient>,
    pub settings: GenerationSettings,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gemini = config
            .gemini_api_key
            .clone()
            .map(|key| GeminiClient::new(key, config.gemini_endpoint()));
        let settings = config.generation_settings();

        Self {
            config,
            gemini,
            settings,
        }
    }

    /// Resolves the Gemini client for one request.
    pub fn gemini_for(&self, headers: &HeaderMap) -> Result<GeminiClient, AppError> {
        let header_key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty());

        match (header_key, &self.gemini) {
            (Some(key), Some(client)) => Ok(client.with_api_key(key.to_string())),
            (Some(key), None) => Ok(GeminiClient::new(
                key.to_string(),
                self.config.gemini_endpoint(),
            )),
            (None, Some(client)) => Ok(client.clone()),
            (None, None) => Err(AppError::Configuration(format!(
                "Gemini API key is not configured. Set GEMINI_API_KEY or send the {API_KEY_HEADER} header."
            ))),
        }
    }

    /// Orchestrator backed by Gemini for both artwork and bubble detection.
    pub fn orchestrator(&self, gemini: GeminiClient) -> GenerationOrchestrator {
        let gemini = Arc::new(gemini);
        GenerationOrchestrator::new(gemini.clone(), gemini, self.settings.clone())
    }
}
