//! The cookie-backed session store.
//!
//! The store wraps a [`CookieJar`]. On the server the jar is filled from
//! the request's `Cookie` header; `save` and `clear` record changes in the
//! jar's delta, which the HTTP layer turns into `Set-Cookie` headers via
//! [`SessionStore::set_cookie_headers`]. Reads always see the latest
//! write, so a `save` followed by a `load` in the same request behaves as
//! expected.

use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, CookieJar};
use warden_codec::{SessionClaims, SessionToken, decode_session_payload_at, unix_millis};

use crate::CookieConfig;

/// Reads and writes the session token cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    jar: CookieJar,
    config: CookieConfig,
}

impl SessionStore {
    /// Creates a store over an empty jar.
    pub fn new(config: CookieConfig) -> Self {
        Self::with_jar(config, CookieJar::new())
    }

    /// Creates a store over an existing jar.
    pub fn with_jar(config: CookieConfig, jar: CookieJar) -> Self {
        Self { jar, config }
    }

    /// Creates a store from a raw `Cookie` request header.
    ///
    /// Pairs that don't parse are skipped. The parsed cookies become the
    /// jar's originals, so they never show up as `Set-Cookie` output.
    pub fn from_cookie_header(config: CookieConfig, header: Option<&str>) -> Self {
        let mut jar = CookieJar::new();
        if let Some(header) = header {
            // `split_parse` needs an owned string to hand out `'static`
            // cookies, which the jar requires.
            for cookie in Cookie::split_parse(header.to_string()).flatten() {
                jar.add_original(cookie);
            }
        }
        Self::with_jar(config, jar)
    }

    /// Persists `token`, replacing any existing session.
    pub fn save(&mut self, token: &SessionToken) {
        let max_age = Duration::seconds(self.config.max_age_secs);
        let cookie = Cookie::build((self.config.name.clone(), token.as_str().to_string()))
            .path(self.config.path.clone())
            .secure(self.config.secure)
            .same_site(self.config.same_site)
            .max_age(max_age)
            .expires(OffsetDateTime::now_utc() + max_age)
            .build();
        self.jar.add(cookie);
        tracing::debug!(cookie = %self.config.name, "session saved");
    }

    /// Returns the stored token, or `None` if there isn't one.
    pub fn load(&self) -> Option<SessionToken> {
        self.jar
            .get(&self.config.name)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
            .map(SessionToken::new)
    }

    /// Removes the session cookie.
    ///
    /// Always emits a removal cookie, even when nothing was stored, so a
    /// client holding a cookie the server never saw still drops it.
    pub fn clear(&mut self) {
        // `make_removal` blanks the value and sets an expiry in the past;
        // the path must match the original for the browser to drop it.
        let mut removal = Cookie::build((self.config.name.clone(), ""))
            .path(self.config.path.clone())
            .secure(self.config.secure)
            .same_site(self.config.same_site)
            .build();
        removal.make_removal();
        self.jar.add(removal);
        tracing::debug!(cookie = %self.config.name, "session cleared");
    }

    /// Returns the decoded claims of the stored token, if it is readable
    /// and unexpired.
    pub fn claims(&self) -> Option<SessionClaims> {
        self.claims_at(unix_millis())
    }

    /// [`claims`](Self::claims) against an explicit clock.
    pub fn claims_at(&self, now_millis: i64) -> Option<SessionClaims> {
        let token = self.load()?;
        decode_session_payload_at(token.as_str(), now_millis)
    }

    /// Returns `true` if a readable, unexpired token is stored.
    pub fn is_valid(&self) -> bool {
        self.claims().is_some()
    }

    /// `Set-Cookie` header values for everything written to this store.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar.delta().map(|cookie| cookie.to_string()).collect()
    }

    /// The cookie settings this store writes with.
    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// The underlying jar.
    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }
}

// =========================================================================
// Tests
// =========================================================================
