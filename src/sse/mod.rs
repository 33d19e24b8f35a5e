//! SSE (Server-Sent Events) reply decoding
//!
//! Decodes the chat backend's streaming reply body. The wire format is a
//! sequence of UTF-8 records separated by a blank line:
//! - `data: <json>` - the only meaningful record shape
//! - `\n\n` - record delimiter
//! - Anything without the `data: ` prefix is discarded
//!
//! # Module structure
//! - `events` - Decoded event types (ParsedEvent, DecoderState, RecordError)
//! - `payloads` - Internal payload deserialization struct
//! - `decoder` - Incremental decoding (StreamingReplyDecoder, parse_record)

mod decoder;
mod events;
mod payloads;

// Re-export public types
pub use decoder::{parse_record, StreamingReplyDecoder, DATA_PREFIX, RECORD_DELIMITER};
pub use events::{DecoderState, ParsedEvent, RecordError};
