//! Cookie configuration.

use std::fmt;
use std::str::FromStr;

use cookie::SameSite;

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE_NAME: &str = "admin_session";

/// How long a saved session cookie lives: one day.
const ONE_DAY_SECS: i64 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// The deployment environment.
///
/// Only affects transport flags: local development usually runs over
/// plain `http://localhost`, where a `Secure` cookie would never be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

// ---------------------------------------------------------------------------
// CookieConfig
// ---------------------------------------------------------------------------

/// Attributes of the session cookie.
///
/// The defaults are the production settings; use
/// [`CookieConfig::for_environment`] to relax `secure` locally.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name. Default: `admin_session`.
    pub name: String,

    /// Cookie path. Default: `/`, so every route sees the session.
    pub path: String,

    /// Lifetime of a saved cookie, in seconds. Default: one day.
    ///
    /// This is independent of the token's own `exp`: whichever runs out
    /// first ends the session.
    pub max_age_secs: i64,

    /// Whether the cookie is only sent over HTTPS.
    pub secure: bool,

    /// Cross-site policy. Default: `Lax`, so the cookie survives the
    /// top-level navigation back from the identity provider.
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            max_age_secs: ONE_DAY_SECS,
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    /// Default settings with `secure` enabled everywhere except development.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            secure: environment != Environment::Development,
            ..Self::default()
        }
    }
}
