//! Bearer token claims.
//!
//! The client never verifies signatures; it only reads the payload segment to
//! learn when the token expires and who it belongs to.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::{IcpError, Result};

/// Claims the client cares about. Unknown claims are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp (seconds).
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the backend has already analyzed a resume for this user.
    #[serde(default)]
    pub has_analyzed: bool,
}

impl TokenClaims {
    /// Seconds left before expiry, clamped at zero. `None` without an `exp` claim.
    pub fn remaining_secs(&self, now_unix: i64) -> Option<u64> {
        self.exp.map(|exp| exp.saturating_sub(now_unix).max(0) as u64)
    }
}

/// Tokens persisted by older front ends as the literal strings "undefined" or "null".
pub fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token == "undefined" || token == "null"
}

/// Decodes the payload segment of a JWT.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| IcpError::Unauthorized("token has no payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IcpError::Unauthorized(format!("token payload is not base64url: {}", e)))?;

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_claims() {
        let token = encode_test_token(&json!({
            "exp": 1_700_000_100,
            "name": "Aina",
            "email": "aina@example.com",
            "has_analyzed": true,
            "sub": "abc"
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, Some(1_700_000_100));
        assert_eq!(claims.name.as_deref(), Some("Aina"));
        assert!(claims.has_analyzed);
        assert_eq!(claims.remaining_secs(1_700_000_000), Some(100));
        assert_eq!(claims.remaining_secs(1_800_000_000), Some(0));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_claims("not-a-token").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
    }

    #[test]
    fn test_placeholder_tokens() {
        assert!(is_placeholder_token("undefined"));
        assert!(is_placeholder_token("null"));
        assert!(is_placeholder_token("  "));
        assert!(!is_placeholder_token("a.b.c"));
    }
}
