//! SSE event types and definitions
//!
//! Contains the ParsedEvent produced for every well-formed record of the
//! chat stream, the decoder lifecycle state, and the reasons a record can
//! be dropped.

use std::fmt;

use super::payloads::EventPayload;

/// A decoded chat stream record.
///
/// Carries whichever of the four recognized fields were present in the
/// record's JSON body. A record with none of them decodes to an empty event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEvent {
    /// Incremental text to append to the in-progress reply
    pub token: Option<String>,
    /// Normal end of the turn
    pub done: Option<bool>,
    /// Conversation created by this turn (delivered with `done`)
    pub conversation_id: Option<String>,
    /// Upstream failure, terminal for the turn
    pub error: Option<String>,
}

impl ParsedEvent {
    /// Event carrying a single token.
    pub fn token(text: impl Into<String>) -> Self {
        Self {
            token: Some(text.into()),
            ..Self::default()
        }
    }

    /// Completion event, optionally carrying a new conversation id.
    pub fn done(conversation_id: Option<&str>) -> Self {
        Self {
            done: Some(true),
            conversation_id: conversation_id.map(str::to_string),
            ..Self::default()
        }
    }

    /// Upstream error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// True for `done: true` or any `error`; nothing follows these in a turn.
    pub fn is_terminal(&self) -> bool {
        self.error.is_some() || self.is_done()
    }

    /// True when the record marked normal completion.
    pub fn is_done(&self) -> bool {
        self.done == Some(true)
    }

    /// True when none of the recognized fields were present.
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
            && self.done.is_none()
            && self.conversation_id.is_none()
            && self.error.is_none()
    }

    /// Returns the event type name as a string for logging purposes.
    pub fn kind(&self) -> &'static str {
        if self.error.is_some() {
            "error"
        } else if self.is_done() {
            "done"
        } else if self.token.is_some() {
            "token"
        } else {
            "empty"
        }
    }
}

impl From<EventPayload> for ParsedEvent {
    fn from(payload: EventPayload) -> Self {
        Self {
            token: payload.token,
            done: payload.done,
            conversation_id: payload.conversation_id,
            error: payload.error,
        }
    }
}

/// Lifecycle of a decoder instance. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Accepting chunks
    #[default]
    Streaming,
    /// Finished, or a terminal event was seen
    Closed,
}

/// Reasons a complete record is dropped instead of producing an event.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Record does not start with `data: `
    MissingPrefix,
    /// Payload is not a JSON object with the expected field types
    InvalidJson { source: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingPrefix => write!(f, "record is missing the data prefix"),
            RecordError::InvalidJson { source } => write!(f, "invalid record payload: {}", source),
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(ParsedEvent::token("Hel").token.as_deref(), Some("Hel"));

        let done = ParsedEvent::done(Some("c1"));
        assert_eq!(done.done, Some(true));
        assert_eq!(done.conversation_id.as_deref(), Some("c1"));

        let err = ParsedEvent::error("rate limited");
        assert_eq!(err.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_terminal_detection() {
        assert!(!ParsedEvent::token("x").is_terminal());
        assert!(ParsedEvent::done(None).is_terminal());
        assert!(ParsedEvent::error("e").is_terminal());

        let not_done = ParsedEvent {
            done: Some(false),
            ..ParsedEvent::default()
        };
        assert!(!not_done.is_terminal());
        assert!(!not_done.is_empty());
    }

    #[test]
    fn test_empty_event() {
        assert!(ParsedEvent::default().is_empty());
        assert_eq!(ParsedEvent::default().kind(), "empty");
    }

    #[test]
    fn test_kind_prefers_error() {
        let event = ParsedEvent {
            token: Some("x".to_string()),
            error: Some("boom".to_string()),
            ..ParsedEvent::default()
        };
        assert_eq!(event.kind(), "error");
        assert_eq!(ParsedEvent::done(None).kind(), "done");
        assert_eq!(ParsedEvent::token("t").kind(), "token");
    }

    #[test]
    fn test_decoder_state_default() {
        assert_eq!(DecoderState::default(), DecoderState::Streaming);
    }

    #[test]
    fn test_record_error_display() {
        assert!(RecordError::MissingPrefix.to_string().contains("prefix"));
        let err = RecordError::InvalidJson {
            source: "expected value".to_string(),
        };
        assert!(err.to_string().contains("expected value"));
    }
}
