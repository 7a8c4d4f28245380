// Prompt text and response schemas for story intake.
// Reuses cross-cutting fragments from gemini_client::prompts.

use serde_json::{json, Value};

use crate::gemini_client::prompts::JSON_SCHEMA_INSTRUCTION;
use crate::models::Panel;

/// Storyboard prompt template. Replace `{story}` before sending.
pub const STORY_ANALYSIS_TEMPLATE: &str = "Analyze the following story and break it down into a logical \
sequence of comic book panels. For each panel, identify the setting, characters, action, dialogue, and \
any internal monologue.

When determining the breakdown, also consider the narrative weight of each panel. Assign a \
'panel_emphasis' based on its importance. Use 'FULL_PAGE' for climactic, page-turning moments. Use \
'WIDE' for establishing shots or significant horizontal actions. Use 'TALL' for dramatic character \
reveals or vertical actions. Most panels should be 'NORMAL'. This will influence the final comic layout.

{json_instruction}

STORY:
---
{story}
---";

pub fn story_analysis_prompt(story: &str) -> String {
    STORY_ANALYSIS_TEMPLATE
        .replace("{json_instruction}", JSON_SCHEMA_INSTRUCTION)
        .replace("{story}", story)
}

pub fn storyboard_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "storyboard": {
                "type": "ARRAY",
                "description": "The story broken down into a sequence of comic panels.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "panel_number": { "type": "INTEGER", "description": "Sequential number of the panel." },
                        "setting": { "type": "STRING", "description": "Short description of the location and environment." },
                        "characters": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of character names present in the panel."
                        },
                        "action": { "type": "STRING", "description": "A detailed, one-to-two-sentence description of what's happening." },
                        "dialogue": {
                            "type": "STRING",
                            "description": "The text spoken by characters in the panel. Format as 'Character: Line'. Use 'Narrator:' for narration."
                        },
                        "internal_monologue": {
                            "type": "STRING",
                            "description": "Any thought bubbles or inner monologue text. Format as 'Character (thought): text'."
                        },
                        "panel_emphasis": {
                            "type": "STRING",
                            "enum": ["NORMAL", "WIDE", "TALL", "FULL_PAGE"],
                            "description": "Emphasis for this panel to guide layout. 'WIDE' takes the full width of a row, 'TALL' spans multiple rows, 'FULL_PAGE' takes the entire page."
                        }
                    },
                    "required": [
                        "panel_number", "setting", "characters", "action",
                        "dialogue", "internal_monologue", "panel_emphasis"
                    ]
                }
            }
        },
        "required": ["storyboard"]
    })
}

/// Character description prompt. Only actions and settings are sent; dialogue
/// adds tokens without helping appearance.
pub fn character_description_prompt(storyboard: &[Panel], names: &[String]) -> String {
    let roster = names
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");

    let beats = storyboard
        .iter()
        .map(|p| format!("Panel {} ({}): {}", p.panel_number, p.setting, p.action))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following comic book storyboard, generate a detailed visual description for each of \
         the main characters listed. Infer their appearance, clothing, and general demeanor from their \
         actions and the story's context.\n\n\
         CHARACTERS TO DESCRIBE:\n{roster}\n\n\
         STORYBOARD (Actions & Settings):\n---\n{beats}\n---\n\n\
         Provide a plausible, creative description for each character. {JSON_SCHEMA_INSTRUCTION}"
    )
}

pub fn character_description_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "characters": {
                "type": "ARRAY",
                "description": "List of characters with their generated descriptions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": {
                            "type": "STRING",
                            "description": "A detailed visual description of the character inferred from the story. Should be at least 15 words long."
                        }
                    },
                    "required": ["name", "description"]
                }
            }
        },
        "required": ["characters"]
    })
}
