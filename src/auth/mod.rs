//! Authentication state for the chat client.
//!
//! Sign-in itself happens with the external identity provider; this module
//! keeps the resulting session token and the user's API key:
//! - Credentials storage and management
//! - Token claim inspection
//! - Login, logout and API key operations over a [`CredentialsProvider`]

pub mod credentials;
pub mod token;

pub use credentials::{Credentials, CredentialsManager, APP_DIR};
pub use token::{decode_claims, TokenClaims};

use crate::traits::{CredentialsError, CredentialsProvider};

/// Store a session token obtained from the identity provider.
///
/// User id and expiry are read from the token when it is a JWT. An API key
/// saved earlier is kept.
pub async fn login<P: CredentialsProvider>(
    provider: &P,
    access_token: &str,
) -> Result<Credentials, CredentialsError> {
    let token = access_token.trim();
    if token.is_empty() {
        return Err(CredentialsError::Invalid {
            field: "access token",
            reason: "must not be blank".to_string(),
        });
    }

    let mut creds = provider.load().await?.unwrap_or_default();
    let claims = decode_claims(token);
    creds.access_token = Some(token.to_string());
    creds.user_id = claims.as_ref().and_then(|c| c.sub.clone());
    creds.expires_at = claims.and_then(|c| c.exp);

    provider.save(&creds).await?;
    tracing::info!(user_id = ?creds.user_id, "Stored session token");
    Ok(creds)
}

/// Forget the session token, keeping the API key.
pub async fn logout<P: CredentialsProvider>(provider: &P) -> Result<(), CredentialsError> {
    let Some(mut creds) = provider.load().await? else {
        return Ok(());
    };
    creds.access_token = None;
    creds.user_id = None;
    creds.expires_at = None;

    if creds.is_empty() {
        provider.clear().await
    } else {
        provider.save(&creds).await
    }
}

/// Save the user's API key. Surrounding whitespace is trimmed and a blank
/// key is rejected, leaving any stored key untouched.
pub async fn set_api_key<P: CredentialsProvider>(
    provider: &P,
    api_key: &str,
) -> Result<(), CredentialsError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(CredentialsError::Invalid {
            field: "api key",
            reason: "must not be blank".to_string(),
        });
    }

    let mut creds = provider.load().await?.unwrap_or_default();
    creds.api_key = Some(key.to_string());
    provider.save(&creds).await
}

/// Load credentials that can authenticate a request.
pub async fn require_session<P: CredentialsProvider>(
    provider: &P,
) -> Result<Option<Credentials>, CredentialsError> {
    Ok(provider.load().await?.filter(Credentials::is_valid))
}
