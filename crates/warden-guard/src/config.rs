//! Guard configuration.

use serde::{Deserialize, Serialize};

/// Which paths the guard protects and where it sends people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Route roots that require a session. A root protects itself and
    /// every path below it, on segment boundaries: `/dashboard` covers
    /// `/dashboard/orders` but not `/dashboards`.
    pub protected_roots: Vec<String>,

    /// The sign-in page. Exempt from protection.
    pub login_path: String,

    /// Where signed-in users land when they open the sign-in page.
    pub landing_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_roots: vec!["/dashboard".to_string()],
            login_path: "/auth/login".to_string(),
            landing_path: "/dashboard/orders".to_string(),
        }
    }
}

impl GuardConfig {
    /// Returns `true` if `path` lies under a protected root.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_roots.iter().any(|root| {
            let root = root.trim_end_matches('/');
            // `/` trims to "" and protects everything.
            root.is_empty()
                || path == root
                || path
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Returns `true` if `path` is the sign-in page.
    pub fn is_login(&self, path: &str) -> bool {
        let login = self.login_path.trim_end_matches('/');
        path == login || path.strip_suffix('/') == Some(login)
    }
}
