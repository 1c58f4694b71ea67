//! Error types for the codec layer.
//!
//! Callers that only care whether a token is usable go through the
//! `Option`-returning helpers in [`crate::codec`]. The typed errors exist
//! for the places that must tell failures apart, e.g. the route guard
//! distinguishing an expired session from a malformed one.

/// Errors that can occur while reading a token.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The session token is not `header.payload.signature`.
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),

    /// The payload segment is not valid base64 in either alphabet.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded, but is not a session claims record.
    ///
    /// Covers malformed JSON, missing fields (e.g. no `role`), wrong
    /// field types, and roles outside the known set.
    #[error("payload does not match the session claims schema: {0}")]
    Payload(#[from] serde_json::Error),

    /// The claims are well-formed but `exp` is in the past.
    #[error("session expired at {exp}")]
    Expired {
        /// Expiry from the claims, in epoch seconds.
        exp: i64,
    },

    /// A role name outside `admin` / `support`.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}
