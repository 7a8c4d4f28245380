//! Collaborator seams for the generation pipeline.
//!
//! The orchestrator only sees these traits. `GeminiClient` implements both;
//! tests plug in deterministic stubs.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::gemini_client::{GeminiClient, GeminiError};
use crate::generation::prompts::{bubble_detection_prompt, bubble_detection_schema};
use crate::models::Artwork;
use crate::typeset::Bubble;

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

/// Produces panel artwork from a prompt plus optional reference images.
#[async_trait]
pub trait ArtworkGenerator: Send + Sync {
    /// Tag recorded on panels this generator produced.
    fn model_name(&self) -> &str;

    /// One attempt. "No image in the response" is an error like any other.
    async fn generate(&self, prompt: &str, references: &[Artwork]) -> Result<Artwork, ArtworkError>;
}

/// Finds speech and thought bubbles in finished artwork.
#[async_trait]
pub trait BubbleDetector: Send + Sync {
    async fn detect(&self, artwork: &Artwork) -> Result<Vec<Bubble>, ArtworkError>;
}

#[async_trait]
impl ArtworkGenerator for GeminiClient {
    fn model_name(&self) -> &str {
        self.image_model()
    }

    async fn generate(&self, prompt: &str, references: &[Artwork]) -> Result<Artwork, ArtworkError> {
        Ok(self.generate_image(prompt, references).await?)
    }
}

#[derive(Debug, Deserialize)]
struct BubbleResponse {
    #[serde(default)]
    bubbles: Vec<Bubble>,
}

#[async_trait]
impl BubbleDetector for GeminiClient {
    async fn detect(&self, artwork: &Artwork) -> Result<Vec<Bubble>, ArtworkError> {
        let response: BubbleResponse = self
            .call_json_with_image(artwork, &bubble_detection_prompt(), bubble_detection_schema())
            .await?;
        Ok(response.bubbles)
    }
}
