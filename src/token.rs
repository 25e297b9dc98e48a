//! Compact-token payload decoding and liveness checks
//!
//! The login token is a three-segment `header.payload.signature` string with
//! URL-safe base64 segments. Only the payload is consumed here; signature
//! verification is the issuing server's job, and any 401 from the network
//! layer overrides whatever these checks report.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of raw-token characters used as a fallback identity key
/// when the payload cannot be decoded or carries no usable claim.
const RAW_PREFIX_LEN: usize = 32;

/// Errors that can occur when decoding a token
#[derive(Debug, Error)]
pub enum TokenError {
    /// The string does not split into exactly three non-empty segments
    #[error("Token must have 3 dot-separated segments")]
    Format,

    /// The payload segment is not valid URL-safe base64 or not UTF-8 JSON
    #[error("Failed to decode token payload: {0}")]
    Decode(String),

    /// The `exp` claim lies in the past
    #[error("Token expired at {0} (now {1})")]
    Expired(i64, i64),
}

/// Decodes the payload of a compact token and checks its expiry claim.
///
/// Returns the full claims object on success, not just the recognized
/// fields. An `exp` claim equal to the current second is still live;
/// only `exp < now` fails. Performs no signature verification.
///
/// # Errors
/// * `TokenError::Format` - wrong segment count or an empty segment
/// * `TokenError::Decode` - invalid base64url, non-UTF-8, or non-object JSON
/// * `TokenError::Expired` - `exp` is strictly in the past
pub fn decode(token: &str) -> Result<Map<String, Value>, TokenError> {
    decode_at(token, Utc::now().timestamp())
}

/// Returns `true` iff `decode` would succeed. Never panics.
pub fn is_valid(token: &str) -> bool {
    decode(token).is_ok()
}

/// Clock-injectable form of [`decode`]; `now` is seconds since epoch.
pub(crate) fn decode_at(token: &str, now: i64) -> Result<Map<String, Value>, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(TokenError::Format);
    }

    let bytes = decode_base64url(parts[1])?;
    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Decode(format!("payload is not valid JSON: {}", e)))?;
    let claims = match payload {
        Value::Object(map) => map,
        other => {
            return Err(TokenError::Decode(format!(
                "payload is not a JSON object: {}",
                other
            )))
        }
    };

    if let Some(exp) = claims.get("exp").and_then(claim_as_seconds) {
        if exp < now {
            return Err(TokenError::Expired(exp, now));
        }
    }

    Ok(claims)
}

/// Decodes a URL-safe base64 segment, normalizing missing padding.
///
/// Segment lengths with remainder 2 or 3 get `==`/`=` appended; a
/// remainder of 1 is never a valid base64 length.
fn decode_base64url(segment: &str) -> Result<Vec<u8>, TokenError> {
    let padded = match segment.len() % 4 {
        0 => segment.to_string(),
        2 => format!("{}==", segment),
        3 => format!("{}=", segment),
        _ => return Err(TokenError::Decode("illegal base64url length".to_string())),
    };

    URL_SAFE
        .decode(padded)
        .map_err(|e| TokenError::Decode(format!("invalid base64url: {}", e)))
}

/// Reads an expiry claim as whole seconds; tolerates numeric JSON forms.
fn claim_as_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// How a cache owner key was derived from the stored token
///
/// Keeping the provenance explicit lets callers (and tests) distinguish a
/// real subject claim from the raw-prefix fallback used for undecodable
/// tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Derived from a payload claim (`sub`, `user_id`, or `id`)
    Claim(String),
    /// First [`RAW_PREFIX_LEN`] characters of the raw token string
    RawPrefix(String),
}

impl Identity {
    /// The owner-key string used for cache binding
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Claim(s) => s,
            Identity::RawPrefix(s) => s,
        }
    }
}

/// Derives a stable per-user key from a raw token string.
///
/// Tries the decoded payload's `sub`, then `user_id`, then `id`; if the
/// token cannot be decoded or none of those claims is usable, falls back
/// to a fixed-length prefix of the raw string. The result only needs to
/// be stable for the lifetime of the stored token, not globally unique.
pub fn derive_identity(token: &str) -> Identity {
    if let Ok(claims) = decode(token) {
        for field in ["sub", "user_id", "id"] {
            if let Some(value) = claims.get(field) {
                if let Some(text) = claim_to_string(value) {
                    return Identity::Claim(text);
                }
            }
        }
    }

    let prefix: String = token.chars().take(RAW_PREFIX_LEN).collect();
    Identity::RawPrefix(prefix)
}

/// Renders a claim value as an identity string; numbers are accepted
/// because some issuers put numeric user ids in `user_id`/`id`.
fn claim_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds a 3-segment token with the given JSON payload (unsigned).
///
/// Test harness helper shared by the cache and session tests.
#[cfg(test)]
pub(crate) fn make_token(payload: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.signature", header, body)
}
