//! Wire types for the chat backend's REST contract.
//!
//! Conversations and messages are owned by the backend; these types mirror
//! its JSON and add a few client-side helpers.

mod conversation;
mod message;
mod request;

pub use conversation::{derive_title, Conversation, DEFAULT_CONVERSATION_TITLE, MAX_TITLE_CHARS};
pub use message::{Message, Role};
pub use request::{
    ChatRequest, CreateConversationRequest, DeleteResponse, HealthResponse, ModelInfo,
    ModelsRequest, ModelsResponse, UpdateConversationRequest,
};

use serde::{Deserialize, Deserializer};

/// Model used when neither the user nor the conversation picked one
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// Custom deserializer for IDs that may be strings or integers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Treats `null` like a missing string
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}
