//! The identity-token → session-token exchange seam.
//!
//! Warden never issues session tokens. A backend does, after verifying the
//! identity token with the provider. The [`SessionExchange`] trait is how
//! the login flow talks to that backend without knowing how: an HTTP
//! client in production, a canned answer in tests.

use warden_codec::{IdentityToken, SessionToken};

use crate::SessionError;

/// Exchanges a single-use identity token for a session token.
///
/// # Trait bounds
///
/// - `Send + Sync` → one exchanger is shared by every request handler.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use warden_codec::{IdentityToken, SessionToken};
/// use warden_session::{SessionError, SessionExchange};
///
/// /// Rejects everything. Handy for exercising the failure path.
/// struct Closed;
///
/// impl SessionExchange for Closed {
///     async fn exchange(
///         &self,
///         _id_token: &IdentityToken,
///     ) -> Result<SessionToken, SessionError> {
///         Err(SessionError::ExchangeRejected("sign-in is disabled".into()))
///     }
/// }
/// ```
pub trait SessionExchange: Send + Sync + 'static {
    /// Presents `id_token` to the backend and returns the session token.
    ///
    /// # Errors
    /// - [`SessionError::ExchangeRejected`]: the backend said no
    /// - [`SessionError::ExchangeUnavailable`]: the backend couldn't answer
    fn exchange(
        &self,
        id_token: &IdentityToken,
    ) -> impl std::future::Future<Output = Result<SessionToken, SessionError>> + Send;
}
