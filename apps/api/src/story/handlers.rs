//! Axum route handlers for story intake.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Character, Panel};
use crate::state::AppState;
use crate::story::analyzer::{analyze_story, validate_story};
use crate::story::characters::describe_characters;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeStoryRequest {
    pub story: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeStoryResponse {
    pub storyboard: Vec<Panel>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeCharactersRequest {
    pub storyboard: Vec<Panel>,
}

#[derive(Debug, Serialize)]
pub struct DescribeCharactersResponse {
    pub characters: Vec<Character>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/story/analyze
///
/// Breaks raw story text into an ordered storyboard.
pub async fn handle_analyze_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeStoryRequest>,
) -> Result<Json<AnalyzeStoryResponse>, AppError> {
    validate_story(&request.story)?;
    let gemini = state.gemini_for(&headers)?;

    let storyboard = analyze_story(&request.story, &gemini).await?;

    Ok(Json(AnalyzeStoryResponse { storyboard }))
}

/// POST /api/v1/characters/describe
///
/// Describes every character appearing in a storyboard. Reference images are
/// left empty for the user to attach.
pub async fn handle_describe_characters(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DescribeCharactersRequest>,
) -> Result<Json<DescribeCharactersResponse>, AppError> {
    if request.storyboard.is_empty() {
        return Err(AppError::Validation("storyboard cannot be empty".to_string()));
    }
    let gemini = state.gemini_for(&headers)?;

    let characters = describe_characters(&request.storyboard, &gemini).await?;

    Ok(Json(DescribeCharactersResponse { characters }))
}
