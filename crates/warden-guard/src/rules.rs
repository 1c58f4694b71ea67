//! The guard policy as data.
//!
//! Each [`GuardRule`] pairs a condition with an action. Keeping them in a
//! flat, ordered table (instead of nested `if`s) means the precedence is
//! readable at a glance and each rule can be tested on its own.

use std::fmt;

use warden_codec::{CodecError, SessionClaims, SessionToken};
use warden_session::Redirect;

use crate::{GuardAction, GuardConfig};

// ---------------------------------------------------------------------------
// TokenState
// ---------------------------------------------------------------------------

/// What the session cookie held, as far as the guard is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// No session cookie.
    Absent,
    /// A well-formed token whose `exp` has passed.
    Expired,
    /// A token that couldn't be decoded into session claims.
    Malformed,
    /// A decoded, unexpired token.
    Valid(SessionClaims),
}

impl TokenState {
    /// Classifies a stored token as of `now_millis`.
    pub fn inspect(token: Option<&SessionToken>, now_millis: i64) -> Self {
        let Some(token) = token else {
            return Self::Absent;
        };
        match SessionClaims::decode_at(token.as_str(), now_millis) {
            Ok(claims) => Self::Valid(claims),
            Err(CodecError::Expired { .. }) => Self::Expired,
            Err(_) => Self::Malformed,
        }
    }

    /// Returns `true` for [`TokenState::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

// ---------------------------------------------------------------------------
// GuardState
// ---------------------------------------------------------------------------

/// Names the rule that decided a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    UnauthenticatedProtected,
    ExpiredProtected,
    MalformedProtected,
    AuthenticatedProtected,
    AuthenticatedLogin,
    Otherwise,
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnauthenticatedProtected => "unauthenticated-protected",
            Self::ExpiredProtected => "expired-protected",
            Self::MalformedProtected => "malformed-protected",
            Self::AuthenticatedProtected => "authenticated-protected",
            Self::AuthenticatedLogin => "authenticated-login",
            Self::Otherwise => "otherwise",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// GuardContext
// ---------------------------------------------------------------------------

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    /// Requested path plus query, e.g. `/dashboard/orders?page=2`.
    pub target: &'a str,
    /// The state of the session cookie.
    pub token: &'a TokenState,
    /// Guard settings.
    pub config: &'a GuardConfig,
}

impl GuardContext<'_> {
    /// The requested path without its query.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target, |(path, _)| path)
    }

    fn is_protected(&self) -> bool {
        self.config.is_protected(self.path())
    }

    fn is_login(&self) -> bool {
        self.config.is_login(self.path())
    }
}

// ---------------------------------------------------------------------------
// GuardRule
// ---------------------------------------------------------------------------

/// One row of the policy table.
///
/// Conditions and actions are plain `fn` pointers: rules carry no state,
/// so the whole table can be a `static`.
pub struct GuardRule {
    /// The state this rule represents.
    pub state: GuardState,
    condition: fn(&GuardContext<'_>) -> bool,
    action: fn(&GuardContext<'_>) -> GuardAction,
}

impl GuardRule {
    /// Returns `true` if this rule applies to `ctx`.
    pub fn matches(&self, ctx: &GuardContext<'_>) -> bool {
        (self.condition)(ctx)
    }

    /// What to do when this rule applies.
    pub fn action(&self, ctx: &GuardContext<'_>) -> GuardAction {
        (self.action)(ctx)
    }
}

impl fmt::Debug for GuardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardRule").field("state", &self.state).finish()
    }
}

/// The policy, in precedence order. The last rule always matches.
pub static RULES: [GuardRule; 6] = [
    GuardRule {
        state: GuardState::UnauthenticatedProtected,
        condition: |ctx| ctx.is_protected() && *ctx.token == TokenState::Absent,
        action: to_login_with_return,
    },
    GuardRule {
        state: GuardState::ExpiredProtected,
        condition: |ctx| ctx.is_protected() && *ctx.token == TokenState::Expired,
        action: clear_and_login,
    },
    GuardRule {
        state: GuardState::MalformedProtected,
        condition: |ctx| ctx.is_protected() && *ctx.token == TokenState::Malformed,
        action: clear_and_login,
    },
    GuardRule {
        state: GuardState::AuthenticatedProtected,
        condition: |ctx| ctx.is_protected() && ctx.token.is_valid(),
        action: |_| GuardAction::Proceed,
    },
    GuardRule {
        state: GuardState::AuthenticatedLogin,
        condition: |ctx| ctx.is_login() && ctx.token.is_valid(),
        action: |ctx| GuardAction::Redirect {
            to: Redirect::to(ctx.config.landing_path.clone()),
            clear_session: false,
        },
    },
    GuardRule {
        state: GuardState::Otherwise,
        condition: |_| true,
        action: |_| GuardAction::Proceed,
    },
];

fn to_login_with_return(ctx: &GuardContext<'_>) -> GuardAction {
    GuardAction::Redirect {
        to: Redirect::to(format!(
            "{}?redirect={}",
            ctx.config.login_path,
            encode_return_target(ctx.target)
        )),
        clear_session: false,
    }
}

fn clear_and_login(ctx: &GuardContext<'_>) -> GuardAction {
    GuardAction::Redirect {
        to: Redirect::to(ctx.config.login_path.clone()),
        clear_session: true,
    }
}

/// Percent-encodes a return target for the `redirect` query parameter.
///
/// `/` is legal inside a query value and is left as is, so the common case
/// reads naturally: `?redirect=/dashboard/orders`.
fn encode_return_target(target: &str) -> String {
    urlencoding::encode(target).replace("%2F", "/")
}
