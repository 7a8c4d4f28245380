// Prompt text for panel artwork and bubble detection.
// Shared JSON fragments live in gemini_client::prompts.

use serde_json::{json, Value};

use crate::gemini_client::prompts::JSON_SCHEMA_INSTRUCTION;
use crate::models::{CustomizationData, Panel, TextRenderingMode, VisualStyle};

const CONSISTENCY_PREAMBLE: &str = "A key goal is to maintain visual consistency for all characters. \
Please refer to the CHARACTER SHEET and any provided reference images to keep character appearances consistent.";

const OVERLAY_INSTRUCTION: &str =
    "IMPORTANT: Do NOT include any text, speech bubbles, or sound effects in the image itself.";

const TYPESET_INSTRUCTION: &str = "If there is dialogue or monologue, render it inside appropriate comic book \
speech or thought bubbles, but KEEP THE BUBBLES EMPTY. The text will be added later. \
Place bubbles carefully to avoid obscuring important visual elements.";

/// Builds the full image prompt for one panel.
///
/// `referenced` names the characters whose reference images are attached to
/// the same request, in attachment order.
pub fn build_panel_prompt(
    panel: &Panel,
    customization: &CustomizationData,
    mode: TextRenderingMode,
    referenced: &[String],
) -> String {
    let character_sheet = customization
        .characters
        .iter()
        .map(|c| format!("- {} (ID: {}): {}", c.name, c.id(), c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let characters_in_panel = if panel.characters.is_empty() {
        "No characters are explicitly mentioned in this panel.".to_string()
    } else {
        format!("Characters in this panel: {}.", panel.characters.join(", "))
    };

    let consistency = consistency_instruction(referenced);
    let text_instruction = text_instruction(panel, mode);
    let framing = framing_instruction(&customization.style);

    format!(
        "{CONSISTENCY_PREAMBLE}\n\n\
         CHARACTER SHEET (DRAMATIS PERSONAE):\n---\n{character_sheet}\n---\n\n\
         {consistency}\n\n\
         PANEL GENERATION INSTRUCTIONS:\n\
         - Style: {framing}\n\
         - Setting: {setting}\n\
         - Action: {action}\n\
         - {characters_in_panel}\n\
         - Aspect Ratio: The image must have a 4:3 aspect ratio.\n\
         - {text_instruction}",
        setting = panel.setting,
        action = panel.action,
    )
    .trim()
    .to_string()
}

fn consistency_instruction(referenced: &[String]) -> String {
    if referenced.is_empty() {
        return String::new();
    }
    format!(
        "CRITICAL CONSISTENCY INSTRUCTIONS:\n\
         - You have been provided with reference images for the following characters: {}.\n\
         - You MUST use these images as the primary guide for the characters' appearance, especially their face, hair, and build.\n\
         - The CHARACTER SHEET description provides context for clothing and expression, but the reference image DICTATES their fundamental look. Ensure high fidelity to the reference.",
        referenced.join(", ")
    )
}

fn text_instruction(panel: &Panel, mode: TextRenderingMode) -> String {
    match mode {
        TextRenderingMode::Overlay => OVERLAY_INSTRUCTION.to_string(),
        TextRenderingMode::InImage => format!(
            "Render any dialogue or internal monologue directly into the image using appropriate comic book \
             conventions (e.g., speech bubbles for dialogue, thought bubbles or caption boxes for monologue). \
             Place them carefully to avoid obscuring important visual elements. \
             Dialogue: \"{}\". Monologue: \"{}\".",
            panel.dialogue, panel.internal_monologue
        ),
        TextRenderingMode::Typeset => TYPESET_INSTRUCTION.to_string(),
    }
}

fn framing_instruction(style: &VisualStyle) -> String {
    if style.is_realistic() {
        format!(
            "Create a single image in the following style: {}. The image should be composed like a \
             cinematic shot or a frame from a photorealistic graphic novel.",
            style.prompt
        )
    } else {
        format!(
            "Create a single comic book panel image in the following style: {}",
            style.prompt
        )
    }
}

/// Bubble detection prompt. Sent with the artwork as the first part.
pub fn bubble_detection_prompt() -> String {
    format!(
        "Analyze this image and provide the coordinates of any speech or thought bubbles. \
         Identify only one bubble for speech (dialogue) and one for thought (monologue), if present. \
         The coordinates should be a bounding box in pixels. If no bubbles are found, return an empty array. \
         {JSON_SCHEMA_INSTRUCTION}"
    )
}

pub fn bubble_detection_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "bubbles": {
                "type": "ARRAY",
                "description": "A list of speech or thought bubbles found in the image.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "description": "Either 'speech' for dialogue or 'thought' for monologue/internal thoughts." },
                        "x": { "type": "INTEGER", "description": "Top-left x-coordinate of the bounding box, in pixels." },
                        "y": { "type": "INTEGER", "description": "Top-left y-coordinate of the bounding box, in pixels." },
                        "width": { "type": "INTEGER", "description": "Width of the bounding box, in pixels." },
                        "height": { "type": "INTEGER", "description": "Height of the bounding box, in pixels." }
                    },
                    "required": ["type", "x", "y", "width", "height"]
                }
            }
        },
        "required": ["bubbles"]
    })
}
