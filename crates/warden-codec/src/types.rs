//! Core token types.
//!
//! Both credentials are wrapped in newtypes so an identity token can never
//! be handed to something expecting a session token (and vice versa), even
//! though both are plain strings underneath.
//!
//! Neither type prints its value through `Debug`: tokens are bearer
//! credentials and must not end up in logs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CodecError;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Credential issued by the external identity provider after sign-in.
///
/// Arrives as `id_token` in the OAuth redirect, is presented exactly once
/// to the session-exchange backend, and is never persisted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Wraps a raw identity token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token, e.g. to put in the exchange request body.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityToken(<{} bytes>)", self.0.len())
    }
}

/// Signed, time-bounded credential issued by the backend.
///
/// The shape is `header.payload.signature`; only the payload is ever
/// looked at on this side (see [`SessionClaims::decode_at`]).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw session token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token, e.g. to write into the session cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Coarse-grained identity classification carried in the session claims.
///
/// `#[serde(rename_all = "lowercase")]` maps the variants to the wire
/// names `"admin"` and `"support"`. Any other string fails to deserialize,
/// which is what makes a claims payload with an unknown role get rejected
/// instead of flowing downstream half-typed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to the portal.
    Admin,
    /// Read-mostly access for customer support staff.
    Support,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::Support];

    /// The wire name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "support" => Ok(Self::Support),
            other => Err(CodecError::UnknownRole(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionClaims
// ---------------------------------------------------------------------------

/// The decoded payload of a [`SessionToken`].
///
/// Every field is required and strictly typed. A payload that is missing
/// a field, carries a string where an integer belongs, or names an unknown
/// role is not a `SessionClaims` at all. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identifier.
    pub sub: String,
    /// Chain account address of the subject.
    pub sui_address: String,
    /// Role determining the permission set.
    pub role: Role,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Expiry, epoch seconds.
    pub exp: i64,
}

impl SessionClaims {
    /// Returns `true` once `exp` lies strictly before `now_millis`.
    ///
    /// `exp` is in seconds while the clock is in milliseconds, so the
    /// comparison is `exp * 1000 < now`. A token is still valid during
    /// the exact millisecond it expires.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.exp.saturating_mul(1000) < now_millis
    }
}
