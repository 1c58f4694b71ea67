//! Server configuration.

use std::time::Duration;

use warden_guard::GuardConfig;
use warden_session::{CookieConfig, Environment};

use crate::WardenError;
use crate::login::LoginConfig;

const ENV_BIND: &str = "WARDEN_BIND";
const ENV_ENVIRONMENT: &str = "WARDEN_ENV";
const ENV_EXCHANGE_URL: &str = "WARDEN_EXCHANGE_URL";
const ENV_CALLBACK_FALLBACK_SECS: &str = "WARDEN_CALLBACK_FALLBACK_SECS";

/// Everything the server needs to run.
#[derive(Debug, Clone)]
pub struct WardenConfig {
    /// Address to listen on.
    pub bind_addr: String,

    /// Deployment environment. Decides the cookie's `Secure` flag.
    pub environment: Environment,

    /// Session cookie attributes.
    pub cookie: CookieConfig,

    /// Protected roots and guard redirect targets.
    pub guard: GuardConfig,

    /// Backend endpoint that trades identity tokens for session tokens.
    pub exchange_url: Option<String>,

    /// How long the callback waits on the exchange before sending the
    /// browser home. The exchange itself keeps running.
    pub callback_fallback: Duration,

    /// Where the callback fallback sends the browser.
    pub home_path: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            environment: Environment::Production,
            cookie: CookieConfig::default(),
            guard: GuardConfig::default(),
            exchange_url: None,
            callback_fallback: Duration::from_secs(10),
            home_path: "/".to_string(),
        }
    }
}

impl WardenConfig {
    /// Reads overrides from the process environment.
    ///
    /// Recognised variables: `WARDEN_BIND`, `WARDEN_ENV`,
    /// `WARDEN_EXCHANGE_URL`, `WARDEN_CALLBACK_FALLBACK_SECS`.
    pub fn from_env() -> Result<Self, WardenError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WardenError> {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = bind;
        }

        if let Some(raw) = lookup(ENV_ENVIRONMENT) {
            let environment = raw
                .parse::<Environment>()
                .map_err(|e| WardenError::Config(format!("{ENV_ENVIRONMENT}: {e}")))?;
            config.environment = environment;
            config.cookie = CookieConfig::for_environment(environment);
        }

        config.exchange_url = lookup(ENV_EXCHANGE_URL).filter(|url| !url.is_empty());

        if let Some(raw) = lookup(ENV_CALLBACK_FALLBACK_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                WardenError::Config(format!("{ENV_CALLBACK_FALLBACK_SECS}: {e}"))
            })?;
            config.callback_fallback = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Settings for the login flow, derived from the guard's.
    pub fn login_config(&self) -> LoginConfig {
        LoginConfig {
            landing_path: self.guard.landing_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = WardenConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.environment, Environment::Production);
        assert!(config.cookie.secure);
        assert_eq!(config.exchange_url, None);
        assert_eq!(config.callback_fallback, Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = WardenConfig::from_lookup(lookup(&[
            ("WARDEN_BIND", "0.0.0.0:9000"),
            ("WARDEN_ENV", "development"),
            ("WARDEN_EXCHANGE_URL", "http://backend/auth/session"),
            ("WARDEN_CALLBACK_FALLBACK_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.cookie.secure, "development cookies are not Secure");
        assert_eq!(config.exchange_url.as_deref(), Some("http://backend/auth/session"));
        assert_eq!(config.callback_fallback, Duration::from_secs(3));
    }

    #[test]
    fn test_from_lookup_bad_environment_is_config_error() {
        let err = WardenConfig::from_lookup(lookup(&[("WARDEN_ENV", "staging")])).unwrap_err();
        assert!(matches!(err, WardenError::Config(_)));
        assert!(err.to_string().contains("WARDEN_ENV"));
    }

    #[test]
    fn test_from_lookup_bad_fallback_is_config_error() {
        let err = WardenConfig::from_lookup(lookup(&[("WARDEN_CALLBACK_FALLBACK_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, WardenError::Config(_)));
    }

    #[test]
    fn test_login_config_follows_guard_landing() {
        let mut config = WardenConfig::default();
        config.guard.landing_path = "/dashboard/users".into();
        assert_eq!(config.login_config().landing_path, "/dashboard/users");
    }
}
