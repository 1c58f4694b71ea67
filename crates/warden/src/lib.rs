//! # Warden
//!
//! Sign-in and route protection for an admin portal.
//!
//! Warden turns an OAuth callback into a cookie-backed session, keeps
//! signed-out users off protected routes, and decides which actions a
//! signed-in role may see. The pieces live in their own crates:
//!
//! - [`warden_codec`]: token types and claims decoding
//! - [`warden_session`]: the session cookie, the session view-model, and
//!   the [`SessionExchange`] seam
//! - [`warden_rbac`]: the role → permission table
//! - [`warden_guard`]: the navigation policy
//!
//! This crate adds the login flow, an HTTP exchange client, and an axum
//! server that wires everything together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::prelude::*;
//!
//! # async fn start() -> Result<(), WardenError> {
//! warden::init_tracing();
//! let config = WardenConfig::from_env()?;
//! let server = WardenServer::builder()
//!     .config(config)
//!     .build(HttpSessionExchange::new("http://backend/auth/session"))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod exchange;
pub mod login;
pub mod server;
mod telemetry;

pub use config::WardenConfig;
pub use error::WardenError;
pub use exchange::HttpSessionExchange;
pub use login::{CallbackLocation, LoginConfig, LoginFlow, LoginOutcome, LoginState};
pub use server::{WardenServer, WardenServerBuilder, router};
pub use telemetry::init_tracing;

pub use warden_session::SessionExchange;

/// Re-exports for the common case.
pub mod prelude {
    pub use crate::{
        HttpSessionExchange, LoginConfig, LoginFlow, LoginOutcome, WardenConfig, WardenError,
        WardenServer, WardenServerBuilder,
    };
    pub use warden_codec::{IdentityToken, Role, SessionClaims, SessionToken};
    pub use warden_guard::{GuardConfig, SessionGuard};
    pub use warden_rbac::{Permission, PermissionSet, gate, has_permission};
    pub use warden_session::{
        CookieConfig, Environment, SessionError, SessionExchange, SessionHook, SessionStore,
    };
}
