//! Dialogue cleanup before lettering.

use std::sync::OnceLock;

use regex::Regex;

/// True for strings the storyboard uses to mean "no text here".
pub fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("n/a")
}

/// Strips `Speaker:` / `Speaker (thought):` attributions and placeholder values.
///
/// Returns an empty string when there is nothing to letter.
pub fn clean_text(raw: &str) -> String {
    static SPEAKER_PREFIX: OnceLock<Regex> = OnceLock::new();

    if is_placeholder(raw) {
        return String::new();
    }

    let prefix = SPEAKER_PREFIX
        .get_or_init(|| Regex::new(r"^(?:.*?(?:\(thought\))?):\s*(.*)$").expect("valid regex"));

    match prefix.captures(raw.trim()) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        None => raw.trim().to_string(),
    }
}
