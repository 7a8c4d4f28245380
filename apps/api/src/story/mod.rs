// Story intake: storyboard analysis and character descriptions.
// Both are single structured calls through gemini_client.

pub mod analyzer;
pub mod characters;
pub mod handlers;
pub mod prompts;
