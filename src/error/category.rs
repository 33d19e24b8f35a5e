//! Error category classification.
//!
//! Categories drive the retry decision and the hint printed next to an
//! error, independent of which layer produced it.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The backend could not be reached, or the connection dropped.
    Network,

    /// Missing, expired or rejected session token.
    Auth,

    /// The backend or the upstream model provider failed (5xx, stream error).
    Server,

    /// The backend answered with something the client cannot read.
    Protocol,

    /// The request itself was wrong (blank message, unknown conversation).
    Input,

    /// Bad environment settings or base URL.
    Configuration,

    /// Local files under the app directory.
    Storage,
}

impl ErrorCategory {
    /// Transient categories where sending the request again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Input => "input",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Storage => "storage",
        }
    }

    /// Suggested next step for the user.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the backend is running and reachable",
            ErrorCategory::Auth => "Sign in again and store the new token with `parley login`",
            ErrorCategory::Server => "The backend or model provider failed. Try again shortly",
            ErrorCategory::Protocol => "The backend sent an unexpected response",
            ErrorCategory::Input => "Check the command arguments and try again",
            ErrorCategory::Configuration => "Check the PARLEY_* environment variables",
            ErrorCategory::Storage => "Check permissions on the ~/.parley directory",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
