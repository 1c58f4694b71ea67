//! Token codec for Warden.
//!
//! This crate defines the two credentials that flow through the portal's
//! login path and how they are read:
//!
//! - **Types** ([`IdentityToken`], [`SessionToken`], [`SessionClaims`],
//!   [`Role`]): the values carried by the OAuth redirect and the
//!   session cookie.
//! - **Codec** ([`parse_oauth_callback`], [`decode_session_payload`]):
//!   pulling an identity token out of a redirect, and reading the claims
//!   out of a session token.
//! - **Errors** ([`CodecError`]): why a token could not be read.
//!
//! # Architecture
//!
//! The codec sits underneath everything else. It doesn't know about
//! cookies, routes, or permissions: it only knows how to turn strings
//! into typed values.
//!
//! ```text
//! Redirect URL → Codec (IdentityToken) → Login flow → Session store
//! Session cookie → Codec (SessionClaims) → Guard / Hook → RBAC
//! ```
//!
//! # Trust boundary
//!
//! Session claims are decoded WITHOUT verifying the token's signature.
//! The result is good enough for routing and display, and nothing more:
//! every state-mutating backend call must verify the token server-side.

mod codec;
mod error;
mod types;

pub use codec::{
    decode_session_payload, decode_session_payload_at, parse_oauth_callback,
    unix_millis,
};
pub use error::CodecError;
pub use types::{IdentityToken, Role, SessionClaims, SessionToken};
