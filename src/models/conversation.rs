use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string};

/// Title given to conversations created without one
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Auto-generated titles are cut to this many characters
pub const MAX_TITLE_CHARS: usize = 60;

/// A conversation as listed in the sidebar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Backend identifier (string or integer on the wire)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub title: String,
    /// Model last used in this conversation
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub model_id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub created_at: String,
}

impl Conversation {
    /// Title to display, falling back to the default for blank titles
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_CONVERSATION_TITLE
        } else {
            &self.title
        }
    }

    /// The conversation's model, if the backend recorded one
    pub fn model(&self) -> Option<&str> {
        if self.model_id.is_empty() {
            None
        } else {
            Some(&self.model_id)
        }
    }
}

/// Title the backend derives for a conversation started by `message`:
/// the first 60 characters of the trimmed text, or the default title.
pub fn derive_title(message: &str) -> String {
    let title: String = message.trim().chars().take(MAX_TITLE_CHARS).collect();
    if title.is_empty() {
        DEFAULT_CONVERSATION_TITLE.to_string()
    } else {
        title
    }
}
