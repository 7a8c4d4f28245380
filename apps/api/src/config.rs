use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::gemini_client::{GeminiEndpoint, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::generation::orchestrator::{GenerationSettings, MAX_ATTEMPTS};

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server-side key. Requests may bring their own via header instead.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_text_model: String,
    pub gemini_image_model: String,
    pub port: u16,
    pub rust_log: String,
    pub retry_delay_ms: u64,
    pub panel_delay_ms: u64,
    pub max_panels: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gemini_text_model: optional_env("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            gemini_image_model: optional_env("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            retry_delay_ms: parse_env("GENERATION_RETRY_DELAY_MS", 2000u64)?,
            panel_delay_ms: parse_env("GENERATION_PANEL_DELAY_MS", 2000u64)?,
            max_panels: parse_env("GENERATION_MAX_PANELS", 400usize)?,
        })
    }

    pub fn gemini_endpoint(&self) -> GeminiEndpoint {
        GeminiEndpoint {
            base_url: self.gemini_base_url.clone(),
            text_model: self.gemini_text_model.clone(),
            image_model: self.gemini_image_model.clone(),
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_attempts: MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(self.retry_delay_ms),
            inter_panel_delay: Duration::from_millis(self.panel_delay_ms),
            max_panels: self.max_panels,
        }
    }
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with no server-side key.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            gemini_text_model: DEFAULT_TEXT_MODEL.to_string(),
            gemini_image_model: DEFAULT_IMAGE_MODEL.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            retry_delay_ms: 2000,
            panel_delay_ms: 2000,
            max_panels: 400,
        }
    }
}
