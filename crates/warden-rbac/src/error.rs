//! Error types for the RBAC layer.

/// Errors raised when parsing authorization names.
///
/// The table lookups themselves never fail; this only surfaces from
/// `FromStr` for callers that want to know WHY a name was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RbacError {
    /// A permission name outside the known set.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
}
