//! Text helpers shared by the handlers

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length of a Telegram text message, in characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^<]+?>").expect("HTML tag pattern should be valid");
    static ref DISALLOWED_CHARS: Regex =
        Regex::new(r"[^\w\s.,!?-]").expect("Character filter pattern should be valid");
}

/// Strip HTML tags, then everything except word characters, whitespace and `.,!?-`
pub fn sanitize_input(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    DISALLOWED_CHARS
        .replace_all(&without_tags, "")
        .trim()
        .to_string()
}

/// Cap `text` at the Telegram limit, ending in `...` when cut
pub fn truncate_response(text: &str) -> String {
    if text.chars().count() <= TELEGRAM_MESSAGE_LIMIT {
        return text.to_string();
    }
    let kept: String = text.chars().take(TELEGRAM_MESSAGE_LIMIT - 3).collect();
    format!("{kept}...")
}

/// Consecutive chunks of at most the Telegram limit
pub fn split_long_message(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(TELEGRAM_MESSAGE_LIMIT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// First word lowercased, and the rest of the message
///
/// A `@botname` suffix on a command is dropped.
pub fn extract_command(text: &str) -> (String, String) {
    let trimmed = text.trim_start();
    let (first, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (trimmed, ""),
    };
    let command = first.split('@').next().unwrap_or(first).to_lowercase();
    (command, rest.to_string())
}

/// `text` after `prefix`, matched case-insensitively, trimmed
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(text[prefix.len()..].trim())
    } else {
        None
    }
}

/// "Tech" from "tech"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_input() {
        assert_eq!(
            sanitize_input("  <b>What</b> is O(n log n)? #complexity  "),
            "What is On log n? complexity"
        );
        assert_eq!(sanitize_input("Café, naïve-approach!"), "Café, naïve-approach!");
    }

    #[test]
    fn test_truncate_response() {
        assert_eq!(truncate_response("short"), "short");
        let long = "a".repeat(5000);
        let truncated = truncate_response(&long);
        assert_eq!(truncated.chars().count(), TELEGRAM_MESSAGE_LIMIT);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_split_long_message() {
        let text = "é".repeat(TELEGRAM_MESSAGE_LIMIT * 2 + 10);
        let parts = split_long_message(&text);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].chars().count(), 10);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_extract_command() {
        assert_eq!(
            extract_command("/START@CompanionBot now please"),
            ("/start".to_string(), "now please".to_string())
        );
        assert_eq!(extract_command("/help"), ("/help".to_string(), String::new()));
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("Career: how to start?", "career:"), Some("how to start?"));
        assert_eq!(strip_prefix_ignore_case("MOCK INTERVIEW: Analyst", "mock interview:"), Some("Analyst"));
        assert_eq!(strip_prefix_ignore_case("campus", "campus:"), None);
        assert_eq!(strip_prefix_ignore_case("é", "career:"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("healthcare"), "Healthcare");
        assert_eq!(capitalize(""), "");
    }
}
