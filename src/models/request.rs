use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    pub model_id: String,
    /// None starts a new conversation; serialized as `null` like the web client
    pub conversation_id: Option<String>,
    /// User-provided model-provider key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ChatRequest {
    /// Create a ChatRequest that starts a new conversation
    pub fn new(message: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model_id: model_id.into(),
            conversation_id: None,
            api_key: None,
        }
    }

    /// Continue an existing conversation
    pub fn with_conversation(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// Body of `POST /api/conversations`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub model_id: String,
}

/// Body of `PATCH /api/conversations/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateConversationRequest {
    pub title: String,
}

/// Body of `POST /api/models`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsRequest {
    pub api_key: String,
}

/// Response of `DELETE /api/conversations/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// A model offered by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Response of `POST /api/models`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response() {
        let health: HealthResponse =
            serde_json::from_str(r#"{"status":"ok","version":"2.0.0"}"#).unwrap();
        assert!(health.is_ok());
        assert_eq!(health.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_chat_request_new_conversation_sends_null() {
        let request = ChatRequest::new("Hello", "m1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "Hello");
        assert_eq!(json["model_id"], "m1");
        assert!(json["conversation_id"].is_null());
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_chat_request_builders() {
        let request = ChatRequest::new("Hi", "m1")
            .with_conversation(Some("c1".to_string()))
            .with_api_key(Some("sk-or-v1-abc".to_string()));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["conversation_id"], "c1");
        assert_eq!(json["api_key"], "sk-or-v1-abc");
    }

    #[test]
    fn test_create_conversation_request_omits_missing_title() {
        let request = CreateConversationRequest {
            title: None,
            model_id: "m1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_models_response_ignores_extra_fields() {
        let json = r#"{"models":[{"id":"a/b","name":"B","pricing":{"prompt":"0"},"context_length":8192}]}"#;
        let response: ModelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.models.len(), 1);
        assert_eq!(response.models[0].context_length, Some(8192));
    }
}
