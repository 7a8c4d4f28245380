// Prompt fragments shared by every structured (JSON) Gemini call.
// Feature modules keep their own prompts.rs next to the code that uses them.

/// Closing line for prompts answered under a `responseSchema`.
pub const JSON_SCHEMA_INSTRUCTION: &str =
    "Ensure the output is a valid JSON object matching the provided schema.";

/// Harm categories relaxed on structured calls. Story text routinely contains
/// fictional violence that would otherwise block storyboard analysis.
pub const RELAXED_HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
