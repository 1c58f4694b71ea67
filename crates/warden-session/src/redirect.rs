//! Navigation targets.

use std::fmt;

/// A location the user should be sent to.
///
/// Produced by the guard, the login flow and logout; the HTTP layer turns
/// it into a `Location` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect(String);

impl Redirect {
    /// Creates a redirect to `location` (a path plus optional query).
    pub fn to(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// The target location.
    pub fn location(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
