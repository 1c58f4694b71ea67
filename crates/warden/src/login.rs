//! The login flow controller.
//!
//! When the browser comes back from the identity provider, the callback
//! address carries an identity token. The flow is:
//!
//!   1. Find the callback payload → none means this isn't a callback
//!   2. Extract the identity token → missing is a terminal error
//!   3. Exchange it with the backend for a session token (the only await)
//!   4. Save the session, strip the token from the visible address, and
//!      send the user where they were originally headed
//!
//! There is no automatic retry. A failed attempt leaves the flow in a
//! non-loading state with an error message; the user starts over.

use std::sync::Arc;

use serde::Serialize;
use url::form_urlencoded;
use warden_codec::{decode_session_payload, parse_oauth_callback};
use warden_session::{Redirect, SessionError, SessionExchange, SessionStore};

/// Query parameter naming where to go after sign-in.
const REDIRECT_PARAM: &str = "redirect";

/// Query keys that mark an address as an OAuth callback.
const OAUTH_MARKERS: [&str; 3] = ["id_token", "access_token", "token_type"];

/// Parameters an identity provider may put on the callback address.
/// They're dropped from the address shown after sign-in.
const OAUTH_PARAMS: [&str; 6] = [
    "id_token",
    "access_token",
    "token_type",
    "expires_in",
    "scope",
    "state",
];

// ---------------------------------------------------------------------------
// CallbackLocation
// ---------------------------------------------------------------------------

/// The address the browser landed on, split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackLocation {
    /// Everything before `?` / `#` (may include scheme and host).
    pub path: String,
    /// Query string without the `?`.
    pub query: Option<String>,
    /// Fragment without the `#`.
    pub fragment: Option<String>,
}

impl CallbackLocation {
    /// Splits an href like `https://host/auth/callback?redirect=/x#id_token=..`.
    pub fn parse(href: &str) -> Self {
        let (before_fragment, fragment) = match href.split_once('#') {
            Some((before, fragment)) => (before, Some(fragment.to_string())),
            None => (href, None),
        };
        let (path, query) = match before_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (before_fragment, None),
        };
        Self {
            path: path.to_string(),
            query,
            fragment,
        }
    }

    /// Builds a location from a request's path and raw query.
    pub fn from_request(path: &str, query: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            query: query.map(str::to_string),
            fragment: None,
        }
    }

    /// The string that should hold the OAuth parameters, if this looks
    /// like a callback at all.
    ///
    /// A non-empty fragment always counts. Without one, a query carrying
    /// an OAuth key counts too (providers using `response_mode=query`).
    pub fn callback_payload(&self) -> Option<&str> {
        if let Some(fragment) = self.fragment.as_deref().filter(|f| !f.is_empty()) {
            return Some(fragment);
        }
        self.query
            .as_deref()
            .filter(|q| {
                form_urlencoded::parse(q.as_bytes()).any(|(key, _)| OAUTH_MARKERS.contains(&&*key))
            })
    }

    /// The `redirect` query parameter, if present.
    pub fn redirect_param(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())
    }

    /// The address with the fragment and any OAuth parameters removed.
    pub fn cleaned(&self) -> String {
        let kept: Vec<(String, String)> = self
            .query
            .as_deref()
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .filter(|(key, _)| !OAUTH_PARAMS.contains(&key.as_ref()))
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        if kept.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
        format!("{}?{query}", self.path)
    }
}

// ---------------------------------------------------------------------------
// LoginConfig / LoginState / LoginOutcome
// ---------------------------------------------------------------------------

/// Where the login flow sends people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    /// Default destination after a successful sign-in.
    pub landing_path: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            landing_path: "/dashboard/orders".to_string(),
        }
    }
}

/// What the login screen renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginState {
    /// `true` only while the exchange call is in flight.
    pub loading: bool,
    /// User-visible message from the last failed attempt.
    pub error: Option<String>,
}

/// How a pass through the flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The location isn't an OAuth callback. Nothing happened.
    Idle,
    /// A session was stored.
    SignedIn {
        /// Where to navigate next.
        destination: Redirect,
        /// The address to show in place of the callback address.
        address: String,
    },
    /// The attempt failed; `message` is shown to the user.
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// LoginFlow
// ---------------------------------------------------------------------------

/// Drives one sign-in attempt from callback to stored session.
///
/// The exchanger sits behind an `Arc` so one instance can be shared by
/// every request (and moved into spawned tasks) without cloning the
/// client inside it.
pub struct LoginFlow<E: SessionExchange> {
    exchange: Arc<E>,
    config: LoginConfig,
    state: LoginState,
}

impl<E: SessionExchange> LoginFlow<E> {
    /// Creates a flow in its idle state.
    pub fn new(exchange: Arc<E>, config: LoginConfig) -> Self {
        Self {
            exchange,
            config,
            state: LoginState::default(),
        }
    }

    /// The current render state.
    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Runs the flow for `location`, writing the session into `store`.
    pub async fn handle(
        &mut self,
        location: &CallbackLocation,
        store: &mut SessionStore,
    ) -> LoginOutcome {
        let Some(payload) = location.callback_payload() else {
            return LoginOutcome::Idle;
        };

        let Some(id_token) = parse_oauth_callback(payload) else {
            tracing::warn!(path = %location.path, "callback without identity token");
            return self.fail(SessionError::InvalidCallback);
        };

        self.state = LoginState {
            loading: true,
            error: None,
        };

        match self.exchange.exchange(&id_token).await {
            Ok(session_token) if decode_session_payload(session_token.as_str()).is_none() => {
                tracing::warn!("session exchange returned an unreadable token");
                self.fail(SessionError::InvalidSession)
            }
            Ok(session_token) => {
                store.save(&session_token);
                self.state.loading = false;

                let destination = self.destination(location);
                tracing::info!(destination = %destination, "signed in");
                LoginOutcome::SignedIn {
                    destination,
                    address: location.cleaned(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "session exchange failed");
                self.fail(e)
            }
        }
    }

    fn fail(&mut self, error: SessionError) -> LoginOutcome {
        let message = error.to_string();
        self.state = LoginState {
            loading: false,
            error: Some(message.clone()),
        };
        LoginOutcome::Failed { message }
    }

    /// The `redirect` parameter if it names a local path, else the landing
    /// page. Anything that could leave the site (`//host`, `https://..`,
    /// `/\host`, control characters browsers strip) is ignored.
    fn destination(&self, location: &CallbackLocation) -> Redirect {
        let target = location
            .redirect_param()
            .filter(|target| is_local_path(target))
            .unwrap_or_else(|| self.config.landing_path.clone());
        Redirect::to(target)
    }
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(|c| c.is_ascii_control())
}

// =========================================================================
// Tests
// =========================================================================
