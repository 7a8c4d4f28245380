//! Story analyzer: raw story text to an ordered storyboard.
//!
//! # Rules
//! - Stories of 50 characters or fewer (after trimming) are rejected before
//!   any collaborator call.
//! - Panels keep the order the model returned them in and are renumbered
//!   1..=n, so `panel_number` is a stable key for later edits.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::gemini_client::GeminiClient;
use crate::models::Panel;
use crate::story::prompts::{story_analysis_prompt, storyboard_schema};

/// A story must be strictly longer than this, in characters, after trimming.
pub const MIN_STORY_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct StoryboardResponse {
    storyboard: Vec<Panel>,
}

/// Returns the trimmed story, or a validation error if it is too short.
pub fn validate_story(story: &str) -> Result<&str, AppError> {
    let trimmed = story.trim();
    if trimmed.chars().count() <= MIN_STORY_CHARS {
        return Err(AppError::Validation(format!(
            "Story must be longer than {MIN_STORY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Breaks a story into comic panels with the text model.
pub async fn analyze_story(story: &str, gemini: &GeminiClient) -> Result<Vec<Panel>, AppError> {
    let story = validate_story(story)?;

    let response: StoryboardResponse = gemini
        .call_json(&story_analysis_prompt(story), storyboard_schema())
        .await
        .map_err(|e| AppError::Generation(format!("Story analysis failed: {e}")))?;

    if response.storyboard.is_empty() {
        return Err(AppError::Generation(
            "Story analysis returned no panels".to_string(),
        ));
    }

    let storyboard = renumber(response.storyboard);
    info!("Story analyzed into {} panels", storyboard.len());
    Ok(storyboard)
}

fn renumber(storyboard: Vec<Panel>) -> Vec<Panel> {
    storyboard
        .into_iter()
        .zip(1u32..)
        .map(|(panel, panel_number)| Panel {
            panel_number,
            ..panel
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini_client::GeminiEndpoint;
    use crate::models::Emphasis;

    const LONG_STORY: &str = "Mira rowed across the black harbor while the lighthouse blinked its warning.";

    #[test]
    fn test_short_story_is_rejected() {
        assert!(matches!(
            validate_story("A cat sat."),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_padding_does_not_count_towards_length() {
        let padded = format!("{}{}{}", " ".repeat(40), "x".repeat(50), "\n".repeat(40));
        assert!(validate_story(&padded).is_err());
    }

    #[test]
    fn test_story_of_51_chars_is_accepted() {
        let story = "y".repeat(51);
        assert_eq!(validate_story(&format!("  {story}  ")).unwrap(), story);
    }

    #[test]
    fn test_long_story_passes() {
        assert_eq!(validate_story(LONG_STORY).unwrap(), LONG_STORY);
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_call() {
        // Unroutable endpoint: reaching the network would surface a Generation error instead.
        let gemini = GeminiClient::new(
            "test-key".to_string(),
            GeminiEndpoint {
                base_url: "http://127.0.0.1:9".to_string(),
                ..GeminiEndpoint::default()
            },
        );
        let result = analyze_story("too short", &gemini).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_panels_renumbered_in_order() {
        let panel = |n: u32, setting: &str| Panel {
            panel_number: n,
            setting: setting.to_string(),
            characters: vec![],
            action: "Waves.".to_string(),
            dialogue: "None".to_string(),
            internal_monologue: "None".to_string(),
            panel_emphasis: Emphasis::Normal,
        };
        let renumbered = renumber(vec![panel(3, "a"), panel(3, "b"), panel(7, "c")]);
        let numbers: Vec<(u32, &str)> = renumbered
            .iter()
            .map(|p| (p.panel_number, p.setting.as_str()))
            .collect();
        assert_eq!(numbers, vec![(1, "a"), (2, "b"), (3, "c")]);
    }
}
