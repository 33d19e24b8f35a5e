//! Client for the chat backend's REST API and streamed replies.
//!
//! Every call carries the session token as a bearer header. Transport
//! failures are retried a fixed number of times; HTTP status errors are not.

use futures::Stream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::{ClientConfig, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use crate::error::BackendError;
use crate::models::{
    ChatRequest, Conversation, CreateConversationRequest, DeleteResponse, HealthResponse,
    Message, ModelInfo, ModelsRequest, ModelsResponse, UpdateConversationRequest,
};
use crate::sse::{ParsedEvent, StreamingReplyDecoder};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// Events decoded from one chat reply.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ParsedEvent, BackendError>> + Send>>;

/// Verbs that carry a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonMethod {
    Post,
    Patch,
}

impl JsonMethod {
    fn as_str(self) -> &'static str {
        match self {
            JsonMethod::Post => "POST",
            JsonMethod::Patch => "PATCH",
        }
    }
}

/// Client for the chat backend.
///
/// # Example
///
/// ```ignore
/// use parley::adapters::ReqwestHttpClient;
/// use parley::backend::BackendClient;
///
/// let client = BackendClient::new(ReqwestHttpClient::new(), "http://localhost:8000")
///     .with_token("eyJ...");
/// for conversation in client.list_conversations().await? {
///     println!("{}", conversation.display_title());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BackendClient<C: HttpClient> {
    http: C,
    base_url: String,
    token: Option<String>,
    retries: u32,
    retry_delay: Duration,
}

impl<C: HttpClient> BackendClient<C> {
    /// Create a client for `base_url` with the default retry policy.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Create a client using the base URL and retry policy from `config`.
    pub fn from_config(http: C, config: &ClientConfig) -> Self {
        Self::new(http, config.api_base_url.clone())
            .with_retry_policy(config.retries, config.retry_delay)
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_retry_policy(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self, json_body: bool) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        if json_body {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        headers
    }

    /// Run `send`, retrying transport failures.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut send: F) -> Result<T, HttpError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HttpError>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Err(err) if err.is_transport() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %err,
                        "Request failed, retrying in {:?}",
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    fn check(response: Response) -> Result<Response, BackendError> {
        if response.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(BackendError::from_status(response.status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        let headers = self.headers(false);
        let (url, headers) = (url.as_str(), &headers);

        tracing::debug!(url, "GET");
        let response = self
            .with_retry(path, move || self.http.get(url, headers))
            .await?;
        Ok(Self::check(response)?.json()?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: JsonMethod,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        let headers = self.headers(true);
        let body = serde_json::to_string(body)?;
        let (url, headers, body) = (url.as_str(), &headers, body.as_str());

        tracing::debug!(url, method = method.as_str(), "Sending JSON request");
        let response = match method {
            JsonMethod::Post => {
                self.with_retry(path, move || self.http.post(url, body, headers))
                    .await?
            }
            JsonMethod::Patch => {
                self.with_retry(path, move || self.http.patch(url, body, headers))
                    .await?
            }
        };
        Ok(Self::check(response)?.json()?)
    }

    /// Check that the backend is up. Needs no token.
    pub async fn health_check(&self) -> Result<HealthResponse, BackendError> {
        self.get_json("/health").await
    }

    /// Conversations of the signed-in user, newest first.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        self.get_json("/api/conversations").await
    }

    /// Create a conversation. The backend picks a title when none is given.
    pub async fn create_conversation(
        &self,
        title: Option<&str>,
        model_id: &str,
    ) -> Result<Conversation, BackendError> {
        let request = CreateConversationRequest {
            title: title.map(str::to_string),
            model_id: model_id.to_string(),
        };
        self.send_json(JsonMethod::Post, "/api/conversations", &request).await
    }

    pub async fn rename_conversation(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<Conversation, BackendError> {
        let request = UpdateConversationRequest {
            title: title.to_string(),
        };
        let path = format!("/api/conversations/{}", conversation_id);
        self.send_json(JsonMethod::Patch, &path, &request).await
    }

    /// Delete a conversation and its messages.
    pub async fn delete_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<DeleteResponse, BackendError> {
        let path = format!("/api/conversations/{}", conversation_id);
        let url = self.url(&path);
        let headers = self.headers(false);
        let (url, headers) = (url.as_str(), &headers);

        tracing::debug!(url, "DELETE");
        let response = self
            .with_retry(&path, move || self.http.delete(url, headers))
            .await?;
        Ok(Self::check(response)?.json()?)
    }

    /// Messages of a conversation in chronological order.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, BackendError> {
        self.get_json(&format!("/api/conversations/{}/messages", conversation_id))
            .await
    }

    /// Models available with the given provider key.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<ModelInfo>, BackendError> {
        let request = ModelsRequest {
            api_key: api_key.to_string(),
        };
        let response: ModelsResponse = self.send_json(JsonMethod::Post, "/api/models", &request).await?;
        Ok(response.models)
    }

    /// Send a chat message and stream the reply.
    ///
    /// Only establishing the stream is retried. The returned stream yields
    /// events until a terminal event or the end of the body; a transport
    /// failure mid-body is yielded once as an error and ends the stream.
    pub async fn stream_chat(&self, request: &ChatRequest) -> Result<EventStream, BackendError> {
        let url = self.url("/api/chat");
        let mut headers = self.headers(true);
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        let body = serde_json::to_string(request)?;
        let (url, headers, body) = (url.as_str(), &headers, body.as_str());

        tracing::debug!(
            url,
            model_id = %request.model_id,
            conversation_id = ?request.conversation_id,
            "Starting chat stream"
        );
        let stream = self
            .with_retry("/api/chat", move || self.http.post_stream(url, body, headers))
            .await
            .map_err(|err| match err {
                HttpError::ServerError { status, message } => {
                    BackendError::from_status(status, &message)
                }
                other => BackendError::Http(other),
            })?;

        Ok(decode_reply(stream))
    }
}

struct ReplyState {
    body: ByteStream,
    decoder: StreamingReplyDecoder,
    pending: VecDeque<ParsedEvent>,
}

/// Drive a fresh decoder over a reply body.
pub fn decode_reply(body: ByteStream) -> EventStream {
    let state = ReplyState {
        body,
        decoder: StreamingReplyDecoder::new(),
        pending: VecDeque::new(),
    };

    let events = futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                tracing::debug!(event = event.kind(), "Decoded stream event");
                return Some((Ok(event), state));
            }
            if state.decoder.is_closed() {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.decoder.feed(&chunk)),
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "Chat stream broke off");
                    state.decoder.finish();
                    return Some((Err(BackendError::Http(err)), state));
                }
                None => {
                    tracing::debug!("Chat stream body ended");
                    state.decoder.finish();
                }
            }
        }
    });

    Box::pin(events)
}
