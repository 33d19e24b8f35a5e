//! Chat session state and the per-event update rules.

use crate::models::{Conversation, Message};
use crate::sse::ParsedEvent;

/// Heading shown when no conversation is selected or it has no title
pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";

/// What a decoded event means for the turn in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Keep reading the stream
    Continue,
    /// The reply finished; `conversation_id` is set when the backend
    /// reported which conversation the turn belongs to
    Completed { conversation_id: Option<String> },
    /// The upstream reported an error; the turn is over
    Failed { message: String },
}

impl TurnOutcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, TurnOutcome::Continue)
    }
}

/// State of one chat client.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    /// Sidebar entries, newest first
    pub conversations: Vec<Conversation>,
    pub selected_conversation_id: Option<String>,
    /// Messages of the selected conversation, including optimistic ones
    pub messages: Vec<Message>,
    /// Reply text received so far in the current (or last) turn
    pub streaming_message: String,
    pub model_id: String,
    pub is_streaming: bool,
    /// Last error to show in the banner
    pub api_error: Option<String>,
}

impl ChatSession {
    /// Empty session using `default_model` until a conversation says otherwise.
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            model_id: default_model.into(),
            ..Self::default()
        }
    }

    /// Start a turn.
    ///
    /// Returns the optimistic user message, or `None` when the input is blank
    /// or a reply is still streaming. The message content is trimmed.
    pub fn begin_turn(&mut self, input: &str) -> Option<Message> {
        let content = input.trim();
        if content.is_empty() || self.is_streaming {
            return None;
        }

        let message = Message::local_user(content);
        self.messages.push(message.clone());
        self.streaming_message.clear();
        self.is_streaming = true;
        self.api_error = None;
        Some(message)
    }

    /// Apply one decoded stream event.
    ///
    /// An `error` wins over everything else in the same record. A token is
    /// appended before `done` is honored, so a record carrying both keeps
    /// its text. Events with no recognized fields change nothing.
    pub fn apply_event(&mut self, event: &ParsedEvent) -> TurnOutcome {
        if let Some(error) = &event.error {
            self.is_streaming = false;
            self.api_error = Some(error.clone());
            return TurnOutcome::Failed {
                message: error.clone(),
            };
        }

        if let Some(token) = event.token.as_deref().filter(|t| !t.is_empty()) {
            self.streaming_message.push_str(token);
        }

        if event.is_done() {
            let conversation_id = event
                .conversation_id
                .clone()
                .filter(|id| !id.is_empty());
            if let Some(id) = &conversation_id {
                self.selected_conversation_id = Some(id.clone());
            }
            self.is_streaming = false;
            return TurnOutcome::Completed { conversation_id };
        }

        TurnOutcome::Continue
    }

    /// End the turn after a transport failure.
    pub fn abort_turn(&mut self, message: impl Into<String>) {
        self.is_streaming = false;
        self.api_error = Some(message.into());
    }

    /// The body ended without `done` or `error`; keep what arrived.
    pub fn finish_stream(&mut self) {
        self.is_streaming = false;
    }

    /// Replace the sidebar list.
    ///
    /// With nothing selected yet, selects `remembered` when it is in the
    /// list, else the first conversation, and adopts its model. Returns
    /// whether the selection changed.
    pub fn set_conversations(
        &mut self,
        conversations: Vec<Conversation>,
        remembered: Option<&str>,
    ) -> bool {
        self.conversations = conversations;
        if self.selected_conversation_id.is_some() || self.conversations.is_empty() {
            return false;
        }

        let pick = remembered
            .and_then(|id| self.conversations.iter().find(|c| c.id == id))
            .or_else(|| self.conversations.first())
            .map(|c| (c.id.clone(), c.model().map(str::to_string)));

        match pick {
            Some((id, model)) => {
                self.selected_conversation_id = Some(id);
                if let Some(model) = model {
                    self.model_id = model;
                }
                true
            }
            None => false,
        }
    }

    /// Select a conversation, adopting its model when it has one.
    pub fn select_conversation(&mut self, conversation_id: &str) {
        if self.selected_conversation_id.as_deref() != Some(conversation_id) {
            self.messages.clear();
        }
        self.selected_conversation_id = Some(conversation_id.to_string());
        let model = self
            .conversation(conversation_id)
            .and_then(Conversation::model)
            .map(str::to_string);
        if let Some(model) = model {
            self.model_id = model;
        }
    }

    /// Drop a conversation; clears the selection and messages if it was selected.
    pub fn remove_conversation(&mut self, conversation_id: &str) {
        self.conversations.retain(|c| c.id != conversation_id);
        if self.selected_conversation_id.as_deref() == Some(conversation_id) {
            self.selected_conversation_id = None;
            self.messages.clear();
        }
    }

    /// Add a freshly created conversation at the top and select it.
    pub fn insert_conversation(&mut self, conversation: Conversation) {
        self.selected_conversation_id = Some(conversation.id.clone());
        if let Some(model) = conversation.model() {
            self.model_id = model.to_string();
        }
        self.messages.clear();
        self.conversations.insert(0, conversation);
    }

    /// Merge an updated conversation into the list by id.
    pub fn update_conversation(&mut self, updated: Conversation) {
        if let Some(existing) = self.conversations.iter_mut().find(|c| c.id == updated.id) {
            *existing = updated;
        }
    }

    /// Replace the selected conversation's messages.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn selected_conversation(&self) -> Option<&Conversation> {
        self.selected_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    /// Heading for the chat view.
    pub fn title(&self) -> &str {
        self.selected_conversation()
            .map(|c| c.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or(NEW_CONVERSATION_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn conversation(id: &str, title: &str, model: &str) -> Conversation {
        Conversation {
            id: id.to_string(),
            title: title.to_string(),
            model_id: model.to_string(),
            created_at: String::new(),
        }
    }

    fn streaming_session() -> ChatSession {
        let mut session = ChatSession::new("default/model");
        session.begin_turn("Hi").unwrap();
        session
    }

    #[test]
    fn test_begin_turn_pushes_trimmed_user_message() {
        let mut session = ChatSession::new("m");
        session.streaming_message = "old".to_string();
        session.api_error = Some("old error".to_string());

        let message = session.begin_turn("  Hello  ").unwrap();
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "Hello");
        assert_eq!(session.messages, vec![message]);
        assert!(session.is_streaming);
        assert!(session.streaming_message.is_empty());
        assert!(session.api_error.is_none());
    }

    #[test]
    fn test_begin_turn_rejects_blank_and_busy() {
        let mut session = ChatSession::new("m");
        assert!(session.begin_turn("   ").is_none());
        assert!(session.messages.is_empty());

        session.begin_turn("first").unwrap();
        assert!(session.begin_turn("second").is_none());
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn test_tokens_accumulate_then_done_selects_conversation() {
        let mut session = streaming_session();

        assert_eq!(session.apply_event(&ParsedEvent::token("Hel")), TurnOutcome::Continue);
        assert_eq!(session.apply_event(&ParsedEvent::token("lo")), TurnOutcome::Continue);
        assert_eq!(session.streaming_message, "Hello");

        let outcome = session.apply_event(&ParsedEvent::done(Some("c1")));
        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                conversation_id: Some("c1".to_string())
            }
        );
        assert!(outcome.is_finished());
        assert!(!session.is_streaming);
        assert_eq!(session.selected_conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_done_without_id_keeps_selection() {
        let mut session = streaming_session();
        session.selected_conversation_id = Some("existing".to_string());

        let outcome = session.apply_event(&ParsedEvent::done(None));
        assert_eq!(outcome, TurnOutcome::Completed { conversation_id: None });
        assert_eq!(session.selected_conversation_id.as_deref(), Some("existing"));
    }

    #[test]
    fn test_error_wins_over_token_in_same_record() {
        let mut session = streaming_session();
        let event = ParsedEvent {
            token: Some("ignored".to_string()),
            error: Some("rate limited".to_string()),
            ..ParsedEvent::default()
        };

        let outcome = session.apply_event(&event);
        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                message: "rate limited".to_string()
            }
        );
        assert!(!session.is_streaming);
        assert!(session.streaming_message.is_empty());
        assert_eq!(session.api_error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_token_and_done_in_one_record() {
        let mut session = streaming_session();
        let event = ParsedEvent {
            token: Some("!".to_string()),
            done: Some(true),
            ..ParsedEvent::default()
        };

        assert!(session.apply_event(&event).is_finished());
        assert_eq!(session.streaming_message, "!");
    }

    #[test]
    fn test_empty_and_not_done_events_change_nothing() {
        let mut session = streaming_session();
        session.apply_event(&ParsedEvent::token("a"));

        assert_eq!(session.apply_event(&ParsedEvent::default()), TurnOutcome::Continue);
        let not_done = ParsedEvent {
            done: Some(false),
            ..ParsedEvent::default()
        };
        assert_eq!(session.apply_event(&not_done), TurnOutcome::Continue);
        assert_eq!(session.apply_event(&ParsedEvent::token("")), TurnOutcome::Continue);

        assert!(session.is_streaming);
        assert_eq!(session.streaming_message, "a");
    }

    #[test]
    fn test_abort_and_finish_stream() {
        let mut session = streaming_session();
        session.abort_turn("Connection failed");
        assert!(!session.is_streaming);
        assert_eq!(session.api_error.as_deref(), Some("Connection failed"));

        let mut session = streaming_session();
        session.apply_event(&ParsedEvent::token("partial"));
        session.finish_stream();
        assert!(!session.is_streaming);
        assert!(session.api_error.is_none());
        assert_eq!(session.streaming_message, "partial");
    }

    #[test]
    fn test_set_conversations_restores_remembered_selection() {
        let mut session = ChatSession::new("default/model");
        let changed = session.set_conversations(
            vec![conversation("a", "A", "m/a"), conversation("b", "B", "m/b")],
            Some("b"),
        );

        assert!(changed);
        assert_eq!(session.selected_conversation_id.as_deref(), Some("b"));
        assert_eq!(session.model_id, "m/b");
    }

    #[test]
    fn test_set_conversations_falls_back_to_first() {
        let mut session = ChatSession::new("default/model");
        session.set_conversations(
            vec![conversation("a", "A", ""), conversation("b", "B", "m/b")],
            Some("gone"),
        );

        assert_eq!(session.selected_conversation_id.as_deref(), Some("a"));
        // No model recorded for "a", keep the default
        assert_eq!(session.model_id, "default/model");
    }

    #[test]
    fn test_set_conversations_keeps_existing_selection() {
        let mut session = ChatSession::new("m");
        session.selected_conversation_id = Some("b".to_string());

        let changed = session.set_conversations(vec![conversation("a", "A", "m/a")], None);
        assert!(!changed);
        assert_eq!(session.selected_conversation_id.as_deref(), Some("b"));

        let mut empty = ChatSession::new("m");
        assert!(!empty.set_conversations(Vec::new(), Some("a")));
        assert!(empty.selected_conversation_id.is_none());
    }

    #[test]
    fn test_select_conversation_adopts_model() {
        let mut session = ChatSession::new("m");
        session.set_conversations(
            vec![conversation("a", "A", "m/a"), conversation("b", "B", "m/b")],
            None,
        );
        session.messages.push(Message::local_user("hi"));

        session.select_conversation("b");
        assert_eq!(session.model_id, "m/b");
        assert!(session.messages.is_empty());
        assert_eq!(session.title(), "B");
    }

    #[test]
    fn test_remove_selected_conversation() {
        let mut session = ChatSession::new("m");
        session.set_conversations(
            vec![conversation("a", "A", ""), conversation("b", "B", "")],
            None,
        );
        session.messages.push(Message::local_user("hi"));

        session.remove_conversation("b");
        assert_eq!(session.selected_conversation_id.as_deref(), Some("a"));
        assert_eq!(session.messages.len(), 1);

        session.remove_conversation("a");
        assert!(session.selected_conversation_id.is_none());
        assert!(session.messages.is_empty());
        assert!(session.conversations.is_empty());
    }

    #[test]
    fn test_insert_and_update_conversation() {
        let mut session = ChatSession::new("m");
        session.set_conversations(vec![conversation("a", "A", "")], None);

        session.insert_conversation(conversation("n", "New conversation", "m/n"));
        assert_eq!(session.conversations[0].id, "n");
        assert_eq!(session.selected_conversation_id.as_deref(), Some("n"));
        assert_eq!(session.model_id, "m/n");

        session.update_conversation(conversation("n", "Renamed", "m/n"));
        assert_eq!(session.title(), "Renamed");

        // Unknown ids are ignored
        session.update_conversation(conversation("zzz", "Ghost", ""));
        assert_eq!(session.conversations.len(), 2);
    }

    #[test]
    fn test_title_fallback() {
        let mut session = ChatSession::new("m");
        assert_eq!(session.title(), NEW_CONVERSATION_TITLE);

        session.set_conversations(vec![conversation("a", "", "")], None);
        assert_eq!(session.title(), "New Conversation");
    }
}
