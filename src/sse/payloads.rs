//! SSE payload deserialization structs
//!
//! Contains the internal struct used to deserialize the JSON body of a
//! `data:` record from the chat stream.

use serde::Deserialize;

/// Raw payload of a chat stream record.
/// Every field is optional; the backend sends only the ones relevant to
/// the event (token chunk, completion, or failure).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventPayload {
    /// Incremental piece of generated text
    #[serde(default)]
    pub token: Option<String>,
    /// End of generation for this turn
    #[serde(default)]
    pub done: Option<bool>,
    /// Set on the terminal event when the turn created a conversation
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Upstream failure reported mid-stream
    #[serde(default)]
    pub error: Option<String>,
}
