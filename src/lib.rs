//! parley - streaming chat client
//!
//! Talks to the chat backend's REST API and decodes its Server-Sent Events
//! reply stream incrementally. This library exposes modules for use in the
//! binary and in integration tests.

pub mod adapters;
pub mod app;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod sse;
pub mod state;
pub mod traits;
