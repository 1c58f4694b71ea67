//! Error types for the session layer.

/// Errors that can occur while establishing a session.
///
/// The `Display` text of each variant is what the user sees on the login
/// screen, so keep it human-readable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The redirect didn't carry a usable identity token.
    #[error("Invalid OAuth callback")]
    InvalidCallback,

    /// The backend answered and refused the identity token.
    /// The inner string is the backend's own message.
    #[error("{0}")]
    ExchangeRejected(String),

    /// The backend issued a session token that can't be read.
    #[error("Invalid session token")]
    InvalidSession,

    /// The backend couldn't be reached or answered nonsense.
    #[error("session exchange failed: {0}")]
    ExchangeUnavailable(String),
}
