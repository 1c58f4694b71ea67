//! Route guard for Warden.
//!
//! Every navigation is checked once, synchronously, before anything
//! renders. The policy is an ordered list of rules ([`RULES`]) evaluated
//! top to bottom; the first rule whose condition holds decides.
//!
//! | # | State | Condition | Action |
//! |---|---|---|---|
//! | 1 | `UnauthenticatedProtected` | protected path, no token | redirect to login with `?redirect=<path>` |
//! | 2 | `ExpiredProtected` | protected path, token expired | clear cookie, redirect to login |
//! | 3 | `MalformedProtected` | protected path, token unreadable | clear cookie, redirect to login |
//! | 4 | `AuthenticatedProtected` | protected path, token valid | proceed |
//! | 5 | `AuthenticatedLogin` | login path, token valid | redirect to landing page |
//! | 6 | `Otherwise` | any | proceed |
//!
//! An expired or unreadable token on the login page falls through to rule
//! 6: it counts as no session, not as "already signed in".
//!
//! # Key types
//!
//! - [`SessionGuard`]: evaluates the policy for a request
//! - [`GuardConfig`]: protected roots, login and landing paths
//! - [`TokenState`]: what the session cookie turned out to hold
//! - [`GuardDecision`]: which rule fired and what to do about it
//!
//! Nothing here touches the network. Expiry and structure checks are
//! local; signature checks are the backend's job.

mod config;
mod guard;
mod rules;

pub use config::GuardConfig;
pub use guard::{GuardAction, GuardDecision, SessionGuard};
pub use rules::{GuardContext, GuardRule, GuardState, RULES, TokenState};
