// Comic generation: per-panel artwork with retries, optional typesetting,
// progress events, and final pagination.
// All Gemini calls go through gemini_client; the orchestrator only sees the
// collaborator traits.

pub mod collaborators;
pub mod handlers;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod references;
