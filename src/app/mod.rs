//! Chat app orchestration.
//!
//! [`ChatApp`] ties the backend client to a [`ChatSession`]: every
//! operation calls the backend, folds the result into the session and
//! records failures in `api_error` so a front end can show them.

mod selection;

pub use selection::SelectionStore;

use futures_util::StreamExt;

use crate::auth::Credentials;
use crate::backend::BackendClient;
use crate::config::ClientConfig;
use crate::error::{AppError, ParleyResult};
use crate::models::{
    derive_title, ChatRequest, Conversation, ModelInfo, DEFAULT_CONVERSATION_TITLE,
};
use crate::state::{ChatSession, TurnOutcome};
use crate::traits::HttpClient;

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Reply text as streamed
    pub text: String,
    /// Conversation the turn belongs to, if known
    pub conversation_id: Option<String>,
    /// False when the stream ended without a `done` record
    pub completed: bool,
}

/// A chat client: backend access plus the state it drives.
///
/// # Example
///
/// ```ignore
/// let mut app = ChatApp::new(backend, DEFAULT_MODEL);
/// app.load_conversations().await?;
/// let reply = app.send_message("Hello", |token| print!("{}", token)).await?;
/// ```
pub struct ChatApp<C: HttpClient> {
    backend: BackendClient<C>,
    session: ChatSession,
    selection: Option<SelectionStore>,
    api_key: Option<String>,
    default_model: String,
}

impl<C: HttpClient> ChatApp<C> {
    pub fn new(backend: BackendClient<C>, default_model: impl Into<String>) -> Self {
        let default_model = default_model.into();
        Self {
            backend,
            session: ChatSession::new(default_model.clone()),
            selection: None,
            api_key: None,
            default_model,
        }
    }

    /// App for the configured backend, authenticated with `credentials`.
    pub fn from_config(http: C, config: &ClientConfig, credentials: &Credentials) -> Self {
        let mut backend = BackendClient::from_config(http, config);
        backend.set_token(credentials.access_token.clone());
        Self::new(backend, config.default_model.clone()).with_api_key(credentials.api_key.clone())
    }

    /// Persist the selected conversation through `store`.
    pub fn with_selection_store(mut self, store: SelectionStore) -> Self {
        self.selection = Some(store);
        self
    }

    /// Provider key forwarded with chat and model requests.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    pub fn backend(&self) -> &BackendClient<C> {
        &self.backend
    }

    /// Record a failure for the banner and hand it back.
    fn fail(&mut self, err: impl Into<AppError>) -> AppError {
        let err = err.into();
        tracing::warn!(category = %err.category(), "{}", err);
        self.session.api_error = Some(err.user_message());
        err
    }

    fn remembered_selection(&self) -> Option<String> {
        let store = self.selection.as_ref()?;
        match store.load() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Ignoring stored selection: {:#}", e);
                None
            }
        }
    }

    fn remember_selection(&self) {
        let Some(store) = &self.selection else {
            return;
        };
        if let Err(e) = store.save(self.session.selected_conversation_id.as_deref()) {
            tracing::warn!("Failed to remember selection: {:#}", e);
        }
    }

    /// Refresh the sidebar.
    ///
    /// When nothing was selected, the remembered conversation (or the first
    /// one) is selected and its messages are loaded.
    pub async fn load_conversations(&mut self) -> ParleyResult<()> {
        self.session.api_error = None;
        let conversations = self
            .backend
            .list_conversations()
            .await
            .map_err(|e| self.fail(e))?;
        tracing::debug!(count = conversations.len(), "Loaded conversations");

        let remembered = self.remembered_selection();
        if self
            .session
            .set_conversations(conversations, remembered.as_deref())
        {
            self.remember_selection();
            if let Some(id) = self.session.selected_conversation_id.clone() {
                self.load_messages(&id).await?;
            }
        }
        Ok(())
    }

    /// Replace the message list with the stored messages of a conversation.
    pub async fn load_messages(&mut self, conversation_id: &str) -> ParleyResult<()> {
        self.session.api_error = None;
        let messages = self
            .backend
            .list_messages(conversation_id)
            .await
            .map_err(|e| self.fail(e))?;
        self.session.set_messages(messages);
        Ok(())
    }

    /// Switch to a conversation and load its messages.
    pub async fn select_conversation(&mut self, conversation_id: &str) -> ParleyResult<()> {
        self.session.select_conversation(conversation_id);
        self.remember_selection();
        self.load_messages(conversation_id).await
    }

    /// Create a conversation and select it. Not allowed while streaming.
    pub async fn new_conversation(&mut self, title: Option<&str>) -> ParleyResult<Conversation> {
        if self.session.is_streaming {
            return Err(AppError::Busy);
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_TITLE);
        let model_id = self.current_model().to_string();

        self.session.api_error = None;
        let conversation = self
            .backend
            .create_conversation(Some(title), &model_id)
            .await
            .map_err(|e| self.fail(e))?;

        tracing::info!(conversation_id = %conversation.id, "Created conversation");
        self.session.insert_conversation(conversation.clone());
        self.remember_selection();
        Ok(conversation)
    }

    /// Rename the selected conversation.
    pub async fn rename_selected(&mut self, title: &str) -> ParleyResult<Conversation> {
        let id = self
            .session
            .selected_conversation_id
            .clone()
            .ok_or(AppError::NoConversation)?;
        self.rename_conversation(&id, title).await
    }

    pub async fn rename_conversation(
        &mut self,
        conversation_id: &str,
        title: &str,
    ) -> ParleyResult<Conversation> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::EmptyInput("title"));
        }

        self.session.api_error = None;
        let updated = self
            .backend
            .rename_conversation(conversation_id, title)
            .await
            .map_err(|e| self.fail(e))?;
        self.session.update_conversation(updated.clone());
        Ok(updated)
    }

    /// Delete a conversation; forgets the selection if it was selected.
    pub async fn delete_conversation(&mut self, conversation_id: &str) -> ParleyResult<()> {
        self.session.api_error = None;
        self.backend
            .delete_conversation(conversation_id)
            .await
            .map_err(|e| self.fail(e))?;

        tracing::info!(conversation_id, "Deleted conversation");
        self.session.remove_conversation(conversation_id);
        self.remember_selection();
        Ok(())
    }

    /// Models available with the stored provider key.
    pub async fn list_models(&mut self) -> ParleyResult<Vec<ModelInfo>> {
        let api_key = self.api_key.clone().ok_or(AppError::MissingApiKey)?;
        self.backend
            .list_models(&api_key)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Model for the next request: the session's, else the configured default.
    pub fn current_model(&self) -> &str {
        if self.session.model_id.is_empty() {
            &self.default_model
        } else {
            &self.session.model_id
        }
    }

    /// Send a message and stream the reply.
    ///
    /// `on_token` sees each token as it arrives. After a completed turn the
    /// sidebar and the turn's conversation are reloaded from the backend.
    /// An upstream `error` record fails the turn with [`AppError::Upstream`].
    pub async fn send_message<F>(&mut self, input: &str, mut on_token: F) -> ParleyResult<TurnReply>
    where
        F: FnMut(&str),
    {
        if self.session.is_streaming {
            return Err(AppError::Busy);
        }
        let user_message = self
            .session
            .begin_turn(input)
            .ok_or(AppError::EmptyInput("message"))?;

        let prompt = user_message.content;
        let request = ChatRequest::new(prompt.clone(), self.current_model())
            .with_conversation(self.session.selected_conversation_id.clone())
            .with_api_key(self.api_key.clone());

        let mut events = match self.backend.stream_chat(&request).await {
            Ok(events) => events,
            Err(e) => {
                let err = self.fail(e);
                self.session.abort_turn(err.user_message());
                return Err(err);
            }
        };

        let mut outcome = TurnOutcome::Continue;
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if event.error.is_none() {
                        if let Some(token) = event.token.as_deref().filter(|t| !t.is_empty()) {
                            on_token(token);
                        }
                    }
                    outcome = self.session.apply_event(&event);
                    if outcome.is_finished() {
                        break;
                    }
                }
                Err(e) => {
                    let err = self.fail(e);
                    self.session.abort_turn(err.user_message());
                    return Err(err);
                }
            }
        }
        drop(events);

        let text = self.session.streaming_message.clone();
        match outcome {
            TurnOutcome::Failed { message } => {
                tracing::warn!(error = %message, "Upstream error ended the turn");
                Err(AppError::Upstream(message))
            }
            TurnOutcome::Continue => {
                tracing::warn!("Reply stream ended without completion");
                self.session.finish_stream();
                Ok(TurnReply {
                    text,
                    conversation_id: self.session.selected_conversation_id.clone(),
                    completed: false,
                })
            }
            TurnOutcome::Completed { conversation_id } => {
                let conversation_id =
                    conversation_id.or_else(|| self.session.selected_conversation_id.clone());
                tracing::info!(conversation_id = ?conversation_id, chars = text.len(), "Turn completed");

                if let Some(id) = &conversation_id {
                    if self.session.conversation(id).is_none() {
                        // Shown until the reload below brings the stored entry
                        self.session.insert_conversation(Conversation {
                            id: id.clone(),
                            title: derive_title(&prompt),
                            model_id: self.current_model().to_string(),
                            created_at: chrono::Utc::now().to_rfc3339(),
                        });
                    }
                }
                self.remember_selection();
                self.load_conversations().await?;
                if let Some(id) = &conversation_id {
                    self.load_messages(id).await?;
                }
                Ok(TurnReply {
                    text,
                    conversation_id,
                    completed: true,
                })
            }
        }
    }
}
