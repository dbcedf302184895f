//! Conversation transcripts — the scraped chat that note extraction starts from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Renders one `Role:  content` line per message, role capitalized.
pub fn format_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}:  {}", capitalize(&m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First character uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_format_transcript() {
        let text = format_transcript(&[
            message("user", "What is a monad?"),
            message("ASSISTANT", "A monoid in the category of endofunctors."),
        ]);
        assert_eq!(
            text,
            "User:  What is a monad?\nAssistant:  A monoid in the category of endofunctors."
        );
    }

    #[test]
    fn test_format_transcript_empty() {
        assert_eq!(format_transcript(&[]), "");
        assert_eq!(capitalize(""), "");
    }
}
