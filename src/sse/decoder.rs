//! Incremental chat stream decoding
//!
//! Contains the stateful StreamingReplyDecoder that turns arbitrarily split
//! byte chunks into ParsedEvents, and the per-record parsing function.

use bytes::{Buf, BytesMut};

use crate::sse::events::{DecoderState, ParsedEvent, RecordError};
use crate::sse::payloads::EventPayload;

/// Separates records on the wire.
pub const RECORD_DELIMITER: &str = "\n\n";

/// Every meaningful record starts with this prefix.
pub const DATA_PREFIX: &str = "data: ";

/// Parse one complete, delimiter-free record into an event.
///
/// The record is trimmed, must start with `data: `, and the remainder must
/// be a JSON object. Unknown fields are ignored.
pub fn parse_record(record: &str) -> Result<ParsedEvent, RecordError> {
    let line = record.trim();
    let body = line
        .strip_prefix(DATA_PREFIX)
        .ok_or(RecordError::MissingPrefix)?;

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RecordError::InvalidJson {
            source: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(RecordError::InvalidJson {
            source: "payload is not a JSON object".to_string(),
        });
    }

    let payload: EventPayload =
        serde_json::from_value(value).map_err(|e| RecordError::InvalidJson {
            source: e.to_string(),
        })?;

    Ok(payload.into())
}

/// Stateful decoder for one streamed reply.
///
/// Created per outgoing message, fed every body chunk in order, then
/// finished or dropped. Holds at most one partial record between calls.
#[derive(Debug, Default)]
pub struct StreamingReplyDecoder {
    /// Decoded text not yet split into complete records
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    carry: BytesMut,
    state: DecoderState,
}

impl StreamingReplyDecoder {
    /// Create a new decoder in the `Streaming` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of the body, returning every event it completes.
    ///
    /// Records are yielded in arrival order. Records without the data
    /// prefix or with a malformed payload are skipped. Once a terminal event
    /// is yielded the decoder closes: the rest of the chunk and all later
    /// chunks are ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ParsedEvent> {
        if self.is_closed() {
            if !chunk.is_empty() {
                tracing::debug!(bytes = chunk.len(), "Ignoring chunk fed to closed decoder");
            }
            return Vec::new();
        }

        self.decode_utf8(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        let mut terminal = false;

        while let Some(offset) = self.buffer[consumed..].find(RECORD_DELIMITER) {
            let record = &self.buffer[consumed..consumed + offset];
            consumed += offset + RECORD_DELIMITER.len();

            match parse_record(record) {
                Ok(event) => {
                    terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        break;
                    }
                }
                Err(RecordError::MissingPrefix) if record.trim().is_empty() => {}
                Err(e) => {
                    tracing::debug!("Dropping stream record: {}", e);
                }
            }
        }

        self.buffer.drain(..consumed);

        if terminal {
            self.close();
        }

        events
    }

    /// End of body: discard any partial record and close.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() || !self.carry.is_empty() {
            tracing::debug!(
                bytes = self.buffer.len() + self.carry.len(),
                "Discarding incomplete trailing record"
            );
        }
        self.close();
    }

    /// Current lifecycle state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// True once finished or after a terminal event
    pub fn is_closed(&self) -> bool {
        self.state == DecoderState::Closed
    }

    /// Bytes of decoded text waiting for a delimiter
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    fn close(&mut self) {
        self.buffer.clear();
        self.carry.clear();
        self.state = DecoderState::Closed;
    }

    /// Append the chunk to the text buffer, carrying an incomplete trailing
    /// UTF-8 sequence over to the next call. Invalid bytes become U+FFFD.
    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.carry.extend_from_slice(chunk);

        let remaining = {
            let mut input: &[u8] = &self.carry;
            loop {
                match std::str::from_utf8(input) {
                    Ok(text) => {
                        self.buffer.push_str(text);
                        break 0;
                    }
                    Err(e) => {
                        let (valid, rest) = input.split_at(e.valid_up_to());
                        self.buffer.push_str(&String::from_utf8_lossy(valid));
                        match e.error_len() {
                            Some(len) => {
                                self.buffer.push(char::REPLACEMENT_CHARACTER);
                                input = &rest[len..];
                            }
                            None => break rest.len(),
                        }
                    }
                }
            }
        };

        let consumed = self.carry.len() - remaining;
        self.carry.advance(consumed);
    }
}
