//! Unified error type for Warden.

use warden_codec::CodecError;
use warden_session::SessionError;

/// Top-level error wrapping the sub-crate errors.
///
/// Callers of the `warden` crate deal with this one type; the `#[from]`
/// variants let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// A token could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Signing in or persisting the session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration value was missing or unparseable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Binding or serving the listener failed.
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
