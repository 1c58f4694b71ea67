//! Evaluating the policy for a request.

use warden_codec::unix_millis;
use warden_session::{Redirect, SessionStore};

use crate::{GuardConfig, GuardContext, GuardState, RULES, TokenState};

/// What the HTTP layer should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Render the requested page.
    Proceed,
    /// Send the user elsewhere, optionally dropping the session cookie.
    Redirect { to: Redirect, clear_session: bool },
}

/// The outcome of guarding one request: the rule that fired and its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    pub state: GuardState,
    pub action: GuardAction,
}

impl GuardDecision {
    /// Returns `true` if the request may render.
    pub fn proceeds(&self) -> bool {
        self.action == GuardAction::Proceed
    }

    /// The redirect target, if any.
    pub fn redirect(&self) -> Option<&Redirect> {
        match &self.action {
            GuardAction::Redirect { to, .. } => Some(to),
            GuardAction::Proceed => None,
        }
    }

    /// Returns `true` if the session cookie must be cleared.
    pub fn clears_session(&self) -> bool {
        matches!(self.action, GuardAction::Redirect { clear_session: true, .. })
    }
}

/// Applies the route policy to incoming navigations.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    config: GuardConfig,
}

impl SessionGuard {
    /// Creates a guard with the given configuration.
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// The guard's configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decides a request without side effects.
    ///
    /// `target` is the requested path, optionally followed by its query.
    pub fn evaluate(&self, target: &str, token: &TokenState) -> GuardDecision {
        let ctx = GuardContext {
            target,
            token,
            config: &self.config,
        };
        // The final rule matches unconditionally, so `find` can't come up
        // empty; falling back to `Otherwise` keeps this panic-free anyway.
        RULES
            .iter()
            .find(|rule| rule.matches(&ctx))
            .map(|rule| GuardDecision {
                state: rule.state,
                action: rule.action(&ctx),
            })
            .unwrap_or(GuardDecision {
                state: GuardState::Otherwise,
                action: GuardAction::Proceed,
            })
    }

    /// Decides a request against the session in `store`, clearing the
    /// stored session when the decision says so.
    pub fn check(&self, target: &str, store: &mut SessionStore) -> GuardDecision {
        self.check_at(target, store, unix_millis())
    }

    /// [`check`](Self::check) against an explicit clock.
    pub fn check_at(
        &self,
        target: &str,
        store: &mut SessionStore,
        now_millis: i64,
    ) -> GuardDecision {
        let token = TokenState::inspect(store.load().as_ref(), now_millis);
        let decision = self.evaluate(target, &token);

        if decision.clears_session() {
            store.clear();
        }

        match decision.redirect() {
            Some(to) => tracing::debug!(
                path = target,
                rule = %decision.state,
                location = to.location(),
                "navigation redirected"
            ),
            None => tracing::trace!(path = target, rule = %decision.state, "navigation allowed"),
        }

        decision
    }
}
