//! The session view-model.
//!
//! On mount, the hook reads the stored token once, decodes it, and
//! settles into a state the UI can render from. The decoded result is an
//! immutable [`SessionRecord`] owned by the hook; anything that needs the
//! current user (the permission gate, for instance) gets it passed in
//! explicitly from here.
//!
//! ```text
//!   Loading ──(init: token decodes)──────→ Authenticated(record)
//!      │                                         │
//!      └──(init: absent / undecodable)──→ Unauthenticated ←──(logout)──┘
//! ```
//!
//! `Loading` only exists to avoid flashing the signed-out UI before the
//! first check. The check is synchronous, so once `init` has run the hook
//! never goes back to `Loading`.

use serde::Serialize;
use warden_codec::{Role, SessionClaims, decode_session_payload_at, unix_millis};

use crate::{Redirect, SessionStore};

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// Who is signed in, as reconstructed from the session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    /// Subject identifier (`sub`).
    pub subject: String,
    /// Chain account address (`sui_address`).
    pub address: String,
    /// Role determining what the UI offers.
    pub role: Role,
}

impl From<SessionClaims> for SessionRecord {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            address: claims.sui_address,
            role: claims.role,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The hook's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The initial check hasn't run yet.
    Loading,
    /// No usable session.
    Unauthenticated,
    /// A decoded, unexpired session.
    Authenticated(SessionRecord),
}

// ---------------------------------------------------------------------------
// SessionHook
// ---------------------------------------------------------------------------

/// Session state for one page load.
#[derive(Debug, Clone)]
pub struct SessionHook {
    status: SessionStatus,
    login_path: String,
}

impl SessionHook {
    /// Creates a hook in the `Loading` state.
    ///
    /// `login_path` is where [`logout`](Self::logout) sends the user.
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Loading,
            login_path: login_path.into(),
        }
    }

    /// Creates a hook and runs the initial check right away.
    pub fn mount(store: &mut SessionStore, login_path: impl Into<String>) -> Self {
        let mut hook = Self::new(login_path);
        hook.init(store);
        hook
    }

    /// Runs the initial check against the current wall clock.
    pub fn init(&mut self, store: &mut SessionStore) {
        self.init_at(store, unix_millis());
    }

    /// Runs the initial check against an explicit clock.
    ///
    /// A stored token that fails to decode (malformed or expired) is
    /// cleared from the store. Calling this again after the first check
    /// does nothing.
    pub fn init_at(&mut self, store: &mut SessionStore, now_millis: i64) {
        if self.status != SessionStatus::Loading {
            return;
        }

        let Some(token) = store.load() else {
            self.status = SessionStatus::Unauthenticated;
            return;
        };

        match decode_session_payload_at(token.as_str(), now_millis) {
            Some(claims) => {
                let record = SessionRecord::from(claims);
                tracing::debug!(subject = %record.subject, role = %record.role, "session restored");
                self.status = SessionStatus::Authenticated(record);
            }
            None => {
                store.clear();
                self.status = SessionStatus::Unauthenticated;
            }
        }
    }

    /// Clears the session and returns where to send the user.
    pub fn logout(&mut self, store: &mut SessionStore) -> Redirect {
        store.clear();
        if let SessionStatus::Authenticated(record) = &self.status {
            tracing::info!(subject = %record.subject, "signed out");
        }
        self.status = SessionStatus::Unauthenticated;
        Redirect::to(self.login_path.clone())
    }

    /// The current state.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&SessionRecord> {
        match &self.status {
            SessionStatus::Authenticated(record) => Some(record),
            _ => None,
        }
    }

    /// The signed-in user's role, if any.
    pub fn role(&self) -> Option<Role> {
        self.user().map(|record| record.role)
    }

    /// Returns `true` until the initial check has run.
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    /// Returns `true` if a session was restored.
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

// =========================================================================
// Tests
// =========================================================================
