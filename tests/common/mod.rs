//! Common test utilities for integration tests.
//!
//! Fixtures for credentials and backend payloads, plus helpers that mount
//! the chat backend's endpoints on a wiremock server.

#![allow(dead_code)]

use std::time::Duration;

use parley::adapters::ReqwestHttpClient;
use parley::auth::Credentials;
use parley::backend::BackendClient;
use parley::config::ClientConfig;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-access-token-12345";

/// Credentials that won't expire during test execution.
pub fn test_credentials() -> Credentials {
    Credentials {
        access_token: Some(TEST_TOKEN.to_string()),
        user_id: Some("test-user-id".to_string()),
        expires_at: Some(i64::MAX),
        api_key: Some("sk-or-test".to_string()),
    }
}

pub fn expired_credentials() -> Credentials {
    Credentials {
        expires_at: Some(0),
        ..test_credentials()
    }
}

/// Config pointing at `server` with fast retries.
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_api_base_url(server.uri())
        .with_retries(1)
        .with_retry_delay(Duration::from_millis(10))
}

/// Real reqwest-backed client for `server`, authenticated with [`TEST_TOKEN`].
pub fn backend_for(server: &MockServer) -> BackendClient<ReqwestHttpClient> {
    BackendClient::from_config(ReqwestHttpClient::new(), &test_config(server)).with_token(TEST_TOKEN)
}

pub fn conversation_json(id: &str, title: &str, model_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user_id": "test-user-id",
        "title": title,
        "model_id": model_id,
        "created_at": "2025-01-01T12:00:00+00:00"
    })
}

pub fn message_json(id: &str, role: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "conversation_id": "ignored",
        "role": role,
        "content": content,
        "created_at": "2025-01-01T12:00:00+00:00"
    })
}

/// SSE body made of one `data:` record per payload.
pub fn sse_body(payloads: &[serde_json::Value]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {}\n\n", payload))
        .collect()
}

pub fn sse_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/event-stream")
}

/// Mount `GET /api/conversations` returning `conversations`, requiring the bearer token.
pub async fn mount_conversations(server: &MockServer, conversations: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversations))
        .mount(server)
        .await;
}

/// Mount `GET /api/conversations/{id}/messages`.
pub async fn mount_messages(server: &MockServer, conversation_id: &str, messages: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages))
        .mount(server)
        .await;
}
