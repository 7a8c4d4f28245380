/// Gemini client: the single point of entry for every generative call.
///
/// Story analysis, character descriptions, panel artwork and bubble detection
/// all go through here. No other module builds Gemini requests.
///
/// Two call shapes:
/// - `call_json*`: structured text under a response schema. Retries 429/5xx
///   with exponential backoff, like any idempotent read.
/// - `generate_image`: single attempt. The generation pipeline owns the retry
///   policy for artwork, so retrying here would multiply attempts.
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Artwork;

pub mod prompts;

use prompts::RELAXED_HARM_CATEGORIES;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Gemini returned empty content")]
    EmptyContent,

    #[error("No image data found in the response")]
    NoImage,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl From<&Artwork> for InlineData {
    fn from(art: &Artwork) -> Self {
        Self {
            mime_type: art.mime_type.clone(),
            data: art.data.clone(),
        }
    }
}

impl From<InlineData> for Artwork {
    fn from(inline: InlineData) -> Self {
        Artwork::new(inline.mime_type, inline.data)
    }
}

/// One element of a request's `parts` array: text or inline image bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(art: &Artwork) -> Self {
        Part::Image {
            inline_data: art.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// The first inline image of the first candidate.
    pub fn image(&self) -> Option<&InlineData> {
        self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Where and with which models to talk to Gemini.
#[derive(Debug, Clone)]
pub struct GeminiEndpoint {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Default for GeminiEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: GeminiEndpoint,
}

impl GeminiClient {
    pub fn new(api_key: String, endpoint: GeminiEndpoint) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            endpoint,
        }
    }

    /// Same endpoint and HTTP pool, different credential.
    pub fn with_api_key(&self, api_key: String) -> Self {
        Self {
            client: self.client.clone(),
            api_key,
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn image_model(&self) -> &str {
        &self.endpoint.image_model
    }

    fn url_for(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.base_url.trim_end_matches('/'),
            model
        )
    }

    /// One request, no retries. Non-2xx statuses become `GeminiError::Api`.
    async fn send(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let response = self
            .client
            .post(self.url_for(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini {} call succeeded: prompt_tokens={}, candidate_tokens={}",
                model, usage.prompt_token_count, usage.candidates_token_count
            );
        }
        Ok(parsed)
    }

    /// `send` with retries on 429 and 5xx. Exponential backoff: 1s, 2s.
    async fn send_with_retry(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.send(model, request).await {
                Ok(response) => return Ok(response),
                Err(GeminiError::Api { status, message })
                    if status == 429 || (500..600).contains(&status) =>
                {
                    warn!("Gemini API returned {}: {}", status, message);
                    last_error = Some(GeminiError::Api { status, message });
                }
                Err(GeminiError::Http(e)) => last_error = Some(GeminiError::Http(e)),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(GeminiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the text model under a JSON response schema and deserializes the answer.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
    ) -> Result<T, GeminiError> {
        self.call_json_parts(vec![Part::text(prompt)], schema).await
    }

    /// Like `call_json`, with an image placed before the prompt.
    pub async fn call_json_with_image<T: DeserializeOwned>(
        &self,
        image: &Artwork,
        prompt: &str,
        schema: Value,
    ) -> Result<T, GeminiError> {
        self.call_json_parts(vec![Part::image(image), Part::text(prompt)], schema)
            .await
    }

    async fn call_json_parts<T: DeserializeOwned>(
        &self,
        parts: Vec<Part>,
        schema: Value,
    ) -> Result<T, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
                ..Default::default()
            },
            safety_settings: relaxed_safety_settings(),
        };

        let response = self
            .send_with_retry(&self.endpoint.text_model, &request)
            .await?;
        let text = response.text().ok_or(GeminiError::EmptyContent)?;

        serde_json::from_str(strip_json_fences(&text)).map_err(GeminiError::Parse)
    }

    /// Asks the image model for one picture. Reference images go first, prompt last.
    pub async fn generate_image(
        &self,
        prompt: &str,
        references: &[Artwork],
    ) -> Result<Artwork, GeminiError> {
        let mut parts: Vec<Part> = references.iter().map(Part::image).collect();
        parts.push(Part::text(prompt));

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE", "TEXT"]),
                ..Default::default()
            },
            safety_settings: Vec::new(),
        };

        let response = self.send(&self.endpoint.image_model, &request).await?;
        let Some(image) = response.image().cloned() else {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            debug!("Image response had no inline data (finish reason: {reason})");
            return Err(GeminiError::NoImage);
        };
        Ok(image.into())
    }
}

fn relaxed_safety_settings() -> Vec<SafetySetting> {
    RELAXED_HARM_CATEGORIES
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_image_part_serializes_as_inline_data() {
        let part = Part::image(&Artwork::new("image/jpeg", "QUJD"));
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(value["inlineData"]["data"], "QUJD");
        assert_eq!(serde_json::to_value(Part::text("hi")).unwrap()["text"], "hi");
    }

    #[test]
    fn test_response_image_is_first_inline_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your panel."},
                {"inlineData":{"mimeType":"image/png","data":"UE5H"}}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        let image = response.image().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "UE5H");
        assert_eq!(response.text().as_deref(), Some("Here is your panel."));
    }

    #[test]
    fn test_response_without_candidates_has_no_image_or_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(response.image().is_none());
        assert!(response.text().is_none());
    }

    #[test]
    fn test_json_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text("analyze")],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(serde_json::json!({"type": "OBJECT"})),
                ..Default::default()
            },
            safety_settings: relaxed_safety_settings(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(value["generationConfig"].get("responseModalities").is_none());
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_url_uses_configured_base_and_model() {
        let client = GeminiClient::new(
            "key".to_string(),
            GeminiEndpoint {
                base_url: "http://localhost:9000/".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(
            client.url_for("gemini-2.5-flash"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
