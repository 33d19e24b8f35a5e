//! Errors from talking to the chat backend.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response, or the body stream broke.
    #[error("request failed: {0}")]
    Http(#[from] HttpError),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx body that does not match the expected shape.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Build a status error from a response body.
    ///
    /// The backend reports failures as `{"detail": "..."}`; any other body is
    /// used verbatim, and an empty one falls back to the status code alone.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
        let message = match detail {
            Some(detail) => detail,
            None if body.trim().is_empty() => format!("HTTP {}", status),
            None => body.trim().to_string(),
        };
        BackendError::Status { status, message }
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Http(HttpError::ServerError { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BackendError::Http(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            BackendError::Http(HttpError::ServerError { status, .. })
            | BackendError::Status { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                400..=499 => ErrorCategory::Input,
                _ => ErrorCategory::Server,
            },
            BackendError::Http(_) => ErrorCategory::Network,
            BackendError::Json(_) => ErrorCategory::Protocol,
        }
    }

    /// True for failures where the request might not have reached the backend.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Http(err) => err.is_transport(),
            _ => false,
        }
    }

    /// Message suitable for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Http(HttpError::ServerError { message, .. })
            | BackendError::Status { message, .. } => message.clone(),
            BackendError::Http(err) => format!("Could not reach the backend: {}", err),
            BackendError::Json(_) => "The backend sent an unexpected response".to_string(),
        }
    }
}
