//! Errors surfaced by the chat app and the command line.

use thiserror::Error;

use super::backend::BackendError;
use super::category::ErrorCategory;
use crate::traits::CredentialsError;

/// Failure of a chat app operation.
#[derive(Debug, Error)]
pub enum AppError {
    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The reply stream carried an `error` record.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// No usable session token is stored.
    #[error("not signed in")]
    NotAuthenticated,

    /// A reply is still streaming.
    #[error("a reply is already streaming")]
    Busy,

    /// Required text (message, title) was blank after trimming.
    #[error("{0} is empty")]
    EmptyInput(&'static str),

    /// Listing models needs the user's provider key.
    #[error("no API key stored")]
    MissingApiKey,

    /// The operation needs a selected conversation.
    #[error("no conversation selected")]
    NoConversation,

    /// Invalid environment configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing stored credentials failed.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Backend(err) => err.category(),
            AppError::Upstream(_) => ErrorCategory::Server,
            AppError::NotAuthenticated => ErrorCategory::Auth,
            AppError::Busy
            | AppError::EmptyInput(_)
            | AppError::NoConversation
            | AppError::MissingApiKey => ErrorCategory::Input,
            AppError::Config(_) => ErrorCategory::Configuration,
            AppError::Credentials(CredentialsError::Invalid { .. }) => ErrorCategory::Input,
            AppError::Credentials(_) => ErrorCategory::Storage,
        }
    }

    /// Whether sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Backend(err) => err.is_retryable(),
            AppError::Upstream(_) => true,
            _ => false,
        }
    }

    /// Message suitable for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Backend(err) => err.user_message(),
            AppError::Upstream(message) => message.clone(),
            AppError::NotAuthenticated => {
                "You are not signed in. Run `parley login <token>` first".to_string()
            }
            AppError::MissingApiKey => {
                "No API key stored. Run `parley set-key <key>` first".to_string()
            }
            other => other.to_string(),
        }
    }
}
