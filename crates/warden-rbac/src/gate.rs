//! Permission-gated rendering.
//!
//! UI components ask "may this session see X?" and render nothing when the
//! answer is no. The role is passed in explicitly by whoever owns the
//! session record: there is no ambient "current user" lookup here.

use crate::{Permission, Role, has_permission};

/// Runs `render` only if `role` holds `permission`.
///
/// No role (signed out, or still loading) renders nothing.
///
/// ```rust
/// use warden_rbac::{Permission, Role, gate};
///
/// let button = gate(Some(Role::Admin), Permission::UpdateOrders, || "Refund");
/// assert_eq!(button, Some("Refund"));
///
/// let hidden = gate(None, Permission::ViewOrders, || "Orders");
/// assert_eq!(hidden, None);
/// ```
pub fn gate<T>(
    role: Option<Role>,
    permission: Permission,
    render: impl FnOnce() -> T,
) -> Option<T> {
    role.filter(|r| has_permission(*r, permission)).map(|_| render())
}
