//! Character describer: one visual description per character in a storyboard.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::gemini_client::GeminiClient;
use crate::models::{Character, CharacterId, Panel};
use crate::story::prompts::{character_description_prompt, character_description_schema};

#[derive(Debug, Deserialize)]
struct DescribedCharacter {
    name: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct CharacterResponse {
    #[serde(default)]
    characters: Vec<DescribedCharacter>,
}

/// Unique character names in order of first appearance.
///
/// Names that normalize to the same id ("Old Tom", "old  tom") count once;
/// the first spelling wins. Blank names are skipped.
pub fn collect_character_names(storyboard: &[Panel]) -> Vec<String> {
    let mut seen: Vec<CharacterId> = Vec::new();
    let mut names = Vec::new();

    for name in storyboard.iter().flat_map(|p| p.characters.iter()) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let id = CharacterId::from_name(name);
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);
        names.push(name.to_string());
    }

    names
}

/// Asks the text model to describe every character in the storyboard.
///
/// Returns characters in first-appearance order. A storyboard without
/// characters returns an empty list without calling the model.
pub async fn describe_characters(
    storyboard: &[Panel],
    gemini: &GeminiClient,
) -> Result<Vec<Character>, AppError> {
    let names = collect_character_names(storyboard);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let response: CharacterResponse = gemini
        .call_json(
            &character_description_prompt(storyboard, &names),
            character_description_schema(),
        )
        .await
        .map_err(|e| AppError::Generation(format!("Character description failed: {e}")))?;

    let characters = match_descriptions(&names, response.characters);
    info!("Described {} characters", characters.len());
    Ok(characters)
}

/// Pairs requested names with the model's answers by normalized id.
fn match_descriptions(names: &[String], described: Vec<DescribedCharacter>) -> Vec<Character> {
    names
        .iter()
        .map(|name| {
            let id = CharacterId::from_name(name);
            let description = described
                .iter()
                .find(|d| CharacterId::from_name(&d.name) == id)
                .map(|d| d.description.clone());

            match description {
                Some(description) => Character::new(name.clone(), description),
                None => {
                    warn!("No description returned for character '{name}'");
                    Character::new(name.clone(), String::new())
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Emphasis;

    fn panel(number: u32, characters: &[&str]) -> Panel {
        Panel {
            panel_number: number,
            setting: "Harbor".to_string(),
            characters: characters.iter().map(|c| c.to_string()).collect(),
            action: "Waves.".to_string(),
            dialogue: "None".to_string(),
            internal_monologue: "None".to_string(),
            panel_emphasis: Emphasis::Normal,
        }
    }

    #[test]
    fn test_names_in_first_appearance_order() {
        let storyboard = vec![
            panel(1, &["Mira", "Old Tom"]),
            panel(2, &["Keeper", "Mira"]),
            panel(3, &["old  tom", " "]),
        ];
        assert_eq!(
            collect_character_names(&storyboard),
            vec!["Mira", "Old Tom", "Keeper"]
        );
    }

    #[test]
    fn test_no_characters_no_names() {
        assert!(collect_character_names(&[panel(1, &[])]).is_empty());
    }

    #[test]
    fn test_descriptions_matched_by_id() {
        let names = vec!["Mira".to_string(), "Old Tom".to_string()];
        let described = vec![
            DescribedCharacter {
                name: "old tom".to_string(),
                description: "Weathered fisherman".to_string(),
            },
            DescribedCharacter {
                name: "MIRA".to_string(),
                description: "Courier in a red scarf".to_string(),
            },
        ];
        let characters = match_descriptions(&names, described);
        assert_eq!(characters[0].name, "Mira");
        assert_eq!(characters[0].description, "Courier in a red scarf");
        assert_eq!(characters[1].id().as_str(), "old_tom");
        assert_eq!(characters[1].description, "Weathered fisherman");
        assert!(characters.iter().all(|c| c.reference_image_url.is_none()));
    }

    #[test]
    fn test_missing_description_left_blank() {
        let characters = match_descriptions(&["Keeper".to_string()], Vec::new());
        assert_eq!(characters.len(), 1);
        assert!(characters[0].description.is_empty());
    }
}
