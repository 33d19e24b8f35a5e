//! Access token inspection.
//!
//! The identity provider issues JWTs. The client never verifies them (the
//! backend does); it only reads `sub` and `exp` to fill in local metadata.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// Claims the client cares about.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// User id
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as Unix seconds
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// Returns `None` for anything that is not a three-part token with a
/// base64url JSON payload.
pub fn decode_claims(access_token: &str) -> Option<TokenClaims> {
    let mut parts = access_token.trim().split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
pub(crate) fn make_test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_claims() {
        let token = make_test_token(&serde_json::json!({"sub": "user-1", "exp": 1900000000, "role": "authenticated"}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.exp, Some(1900000000));
    }

    #[test]
    fn test_decode_claims_missing_fields() {
        let token = make_test_token(&serde_json::json!({"aud": "x"}));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_decode_claims_rejects_garbage() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("a.b").is_none());
        assert!(decode_claims("a.b.c.d").is_none());
        assert!(decode_claims("header.!!!invalid-base64!!!.signature").is_none());
    }
}
