//! Session persistence and session state for Warden.
//!
//! This crate owns everything between "the backend handed us a session
//! token" and "the UI knows who is signed in":
//!
//! 1. **Persistence**: the token lives in a single cookie
//!    ([`SessionStore`], configured by [`CookieConfig`])
//! 2. **Session state**: decoding the stored token into a
//!    [`SessionRecord`] once per page load ([`SessionHook`])
//! 3. **Exchange**: the seam to the backend that turns an identity token
//!    into a session token ([`SessionExchange`] trait)
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard / Login flow (above)  ← read and write the session through the store
//!     ↕
//! Session Layer (this crate)  ← cookie persistence, session view-model
//!     ↕
//! Codec Layer (below)  ← token types, claims decoding
//! ```
//!
//! # Concurrency note
//!
//! The cookie is the only shared mutable resource. Every write replaces
//! the whole value (`save`) or removes it (`clear`), so there are no
//! partial updates to race on and no locking anywhere in this crate.

mod config;
mod error;
mod exchange;
mod hook;
mod redirect;
mod store;

pub use config::{CookieConfig, Environment, SESSION_COOKIE_NAME};
pub use error::SessionError;
pub use exchange::SessionExchange;
pub use hook::{SessionHook, SessionRecord, SessionStatus};
pub use redirect::Redirect;
pub use store::SessionStore;

// Re-exported so callers can hand a request's jar to the store without
// depending on `cookie` directly.
pub use cookie::{CookieJar, SameSite};
