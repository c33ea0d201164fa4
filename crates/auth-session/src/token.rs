//! Access-token payload decoding.
//!
//! The access token is a compact three-segment string; only the middle
//! (payload) segment is read here. Signature verification is the
//! server's job, not the client's.

use crate::claims::{Claims, ClaimsRepr};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// Decoded access token: typed claims plus a local expiry check.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub claims: Claims,
    pub is_expired: bool,
}

/// Decode the payload segment of a compact token.
///
/// Returns `None` for any malformed input (wrong segment count, invalid
/// base64, invalid JSON). A malformed token is a recoverable "no
/// session" condition, never an error.
///
/// A token without an `exp` claim reports `is_expired = false`. That is
/// deliberately permissive: the server still rejects a stale token with
/// a 401, which the request pipeline recovers from.
pub fn decode_token(token: &str) -> Option<DecodedToken> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = decode_segment(segments[1])?;
    let repr: ClaimsRepr = serde_json::from_slice(&payload).ok()?;
    let claims = Claims::from(repr);

    let is_expired = match claims.expires_at {
        Some(exp) => exp * 1000 < chrono::Utc::now().timestamp_millis(),
        None => false,
    };

    Some(DecodedToken { claims, is_expired })
}

/// Tokens show up with either base64 alphabet, padded or not.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .or_else(|_| STANDARD.decode(segment))
        .ok()
}
