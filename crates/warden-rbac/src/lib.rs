//! Role-based access control for Warden.
//!
//! A static, read-only table maps each [`Role`] to a [`PermissionSet`].
//! Everything in this crate is a pure function of that table and a
//! caller-supplied role: there is no state and no lifecycle.
//!
//! Unknown roles and unknown permissions fail closed: they are never an
//! error, just `false` (or an empty set).
//!
//! ```rust
//! use warden_rbac::{Permission, Role, has_permission, has_permission_named};
//!
//! assert!(has_permission(Role::Admin, Permission::UpdateOrders));
//! assert!(!has_permission(Role::Support, Permission::UpdateOrders));
//! assert!(!has_permission_named("intern", "view_orders"));
//! ```
//!
//! The client-side check only decides what to render. Effects are still
//! authorized by the backend.

mod error;
mod gate;
mod permission;
mod table;

pub use error::RbacError;
pub use gate::gate;
pub use permission::{Permission, PermissionSet};
pub use table::{
    can_update_orders, can_update_users, has_permission, has_permission_named,
    permissions_for, permissions_for_named,
};
pub use warden_codec::Role;
