//! Client-side chat state.
//!
//! [`ChatSession`] holds everything the chat view shows: the sidebar's
//! conversations, the selected conversation's messages, the reply being
//! streamed and the last API error. It is updated from decoded stream
//! events and from backend responses, and performs no I/O itself.

pub mod session;

pub use session::{ChatSession, TurnOutcome, NEW_CONVERSATION_TITLE};
