//! Reading tokens out of redirects and cookies.
//!
//! Two entry points, one per credential:
//!
//! - [`parse_oauth_callback`]: finds the `id_token` in an OAuth redirect,
//!   whether the provider put it in the fragment or the query string.
//! - [`decode_session_payload`]: reads the claims out of a session token
//!   and drops it if it has expired.
//!
//! Neither function ever panics or returns an error to the caller. A token
//! that can't be read is simply absent; the typed reason is logged at
//! debug level and otherwise discarded.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::{CodecError, IdentityToken, SessionClaims};

/// Parameter name carrying the identity token.
const ID_TOKEN_KEY: &str = "id_token";

/// Substrings that mark a fragment as an OAuth payload.
///
/// SPA routers also use the fragment (`#/dashboard/orders`), so anything
/// without one of these is not treated as a callback at all.
const OAUTH_MARKERS: [&str; 3] = [ID_TOKEN_KEY, "access_token", "token_type"];

// ---------------------------------------------------------------------------
// OAuth callback
// ---------------------------------------------------------------------------

/// Extracts the identity token from an OAuth redirect.
///
/// `input` is the raw fragment (everything after `#`) or query string
/// (everything after `?`); the leading delimiter is optional. A fragment
/// that embeds a query, like `#/callback?id_token=..`, is also accepted.
///
/// Returns `None` when the input isn't OAuth-shaped, has no `id_token`,
/// or has an empty one.
///
/// ```rust
/// use warden_codec::parse_oauth_callback;
///
/// let token = parse_oauth_callback("#id_token=abc123&state=xyz").unwrap();
/// assert_eq!(token.as_str(), "abc123");
///
/// assert!(parse_oauth_callback("#/dashboard/orders").is_none());
/// ```
pub fn parse_oauth_callback(input: &str) -> Option<IdentityToken> {
    if !OAUTH_MARKERS.iter().any(|marker| input.contains(marker)) {
        return None;
    }

    let params = input.trim_start_matches(['#', '?']);

    // Try the whole string first, then whatever follows an embedded `?`.
    // `chain` glues the two candidates into one iterator and `find_map`
    // stops at the first one that yields a token.
    std::iter::once(params)
        .chain(params.split_once('?').map(|(_, query)| query))
        .find_map(find_id_token)
}

/// Looks up a non-empty `id_token` in a `key=value&..` string.
fn find_id_token(params: &str) -> Option<IdentityToken> {
    // `form_urlencoded::parse` percent-decodes keys and values and turns
    // `+` into a space, same as a browser's `URLSearchParams`.
    url::form_urlencoded::parse(params.as_bytes())
        .find(|(key, _)| *key == ID_TOKEN_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(IdentityToken::new)
}

// ---------------------------------------------------------------------------
// Session payload
// ---------------------------------------------------------------------------

impl SessionClaims {
    /// Decodes the claims of a session token as of `now_millis`.
    ///
    /// The signature segment is never checked. See the crate docs for
    /// what that means for callers.
    ///
    /// # Errors
    /// - [`CodecError::SegmentCount`]: not exactly three segments
    /// - [`CodecError::Base64`]: payload segment isn't base64
    /// - [`CodecError::Payload`]: payload isn't a valid claims record
    /// - [`CodecError::Expired`]: `exp * 1000 < now_millis`
    pub fn decode_at(token: &str, now_millis: i64) -> Result<Self, CodecError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [_header, payload, _signature] = segments.as_slice() else {
            return Err(CodecError::SegmentCount(segments.len()));
        };

        let bytes = decode_segment(payload)?;
        let claims: SessionClaims = serde_json::from_slice(&bytes)?;

        if claims.is_expired_at(now_millis) {
            return Err(CodecError::Expired { exp: claims.exp });
        }
        Ok(claims)
    }
}

/// Decodes a session token's claims against the current wall clock.
///
/// Returns `None` for malformed, schema-violating, or expired tokens.
pub fn decode_session_payload(token: &str) -> Option<SessionClaims> {
    decode_session_payload_at(token, unix_millis())
}

/// [`decode_session_payload`] with an explicit clock, in epoch millis.
pub fn decode_session_payload_at(
    token: &str,
    now_millis: i64,
) -> Option<SessionClaims> {
    match SessionClaims::decode_at(token, now_millis) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            None
        }
    }
}

/// Decodes one token segment.
///
/// Backends disagree on the alphabet: JWTs use url-safe base64 without
/// padding, while some issuers emit standard base64 with `=` padding.
/// Normalizing to the url-safe, unpadded form accepts both.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

/// Current wall-clock time in epoch milliseconds.
///
/// A clock set before 1970 reads as 0 rather than failing.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

// =========================================================================
// Tests
// =========================================================================
