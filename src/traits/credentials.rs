//! Credentials provider trait abstraction.
//!
//! The session token comes from the external identity provider and the API
//! key from the user; both are stored locally between runs.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Credentials;

/// Credentials operation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CredentialsError {
    /// Home directory could not be determined
    #[error("could not determine the home directory")]
    NoHomeDirectory,
    /// Reading or writing the credentials file failed
    #[error("credentials file error: {0}")]
    Io(String),
    /// Stored credentials could not be (de)serialized
    #[error("credentials serialization error: {0}")]
    Serialization(String),
    /// Rejected input, such as a blank API key
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Trait for credentials storage and retrieval.
///
/// Abstracts where the session token and API key live so commands that
/// read or update them can be tested without touching the file system.
///
/// # Example
///
/// ```ignore
/// use parley::traits::CredentialsProvider;
///
/// async fn token<P: CredentialsProvider>(provider: &P) -> Option<String> {
///     provider.load().await.ok().flatten().and_then(|c| c.access_token)
/// }
/// ```
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load stored credentials; `Ok(None)` when nothing is stored.
    async fn load(&self) -> Result<Option<Credentials>, CredentialsError>;

    /// Replace the stored credentials.
    async fn save(&self, creds: &Credentials) -> Result<(), CredentialsError>;

    /// Remove all stored credentials.
    async fn clear(&self) -> Result<(), CredentialsError>;
}
