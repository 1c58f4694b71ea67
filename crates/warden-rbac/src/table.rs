//! The static role → permission table and the queries over it.
//!
//! | Permission       | admin | support |
//! |------------------|:-----:|:-------:|
//! | `view_orders`    |   ✓   |    ✓    |
//! | `update_orders`  |   ✓   |         |
//! | `view_users`     |   ✓   |    ✓    |
//! | `update_users`   |   ✓   |         |
//! | `view_analytics` |   ✓   |         |

use crate::{Permission, PermissionSet, Role};

const ADMIN: PermissionSet = PermissionSet::of(&Permission::ALL);

const SUPPORT: PermissionSet =
    PermissionSet::of(&[Permission::ViewOrders, Permission::ViewUsers]);

/// Returns the permission set granted to `role`.
pub fn permissions_for(role: Role) -> PermissionSet {
    match role {
        Role::Admin => ADMIN,
        Role::Support => SUPPORT,
    }
}

/// Like [`permissions_for`], keyed by the role's wire name.
///
/// Unknown names get [`PermissionSet::EMPTY`].
pub fn permissions_for_named(role: &str) -> PermissionSet {
    role.parse::<Role>()
        .map(permissions_for)
        .unwrap_or(PermissionSet::EMPTY)
}

/// Returns `true` if `role` is granted `permission`.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(permission)
}

/// Like [`has_permission`], for string-typed callers.
///
/// An unknown role or an unknown permission yields `false`.
pub fn has_permission_named(role: &str, permission: &str) -> bool {
    match permission.parse::<Permission>() {
        Ok(permission) => permissions_for_named(role).contains(permission),
        Err(_) => false,
    }
}

/// Whether `role` may modify orders.
pub fn can_update_orders(role: Role) -> bool {
    has_permission(role, Permission::UpdateOrders)
}

/// Whether `role` may modify users.
pub fn can_update_users(role: Role) -> bool {
    has_permission(role, Permission::UpdateUsers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_permission() {
        for p in Permission::ALL {
            assert!(has_permission(Role::Admin, p), "admin should have {p}");
        }
    }

    #[test]
    fn test_support_cannot_update_orders() {
        assert!(!has_permission(Role::Support, Permission::UpdateOrders));
        assert!(!has_permission_named("support", "update_orders"));
    }

    #[test]
    fn test_support_permissions_are_view_only() {
        let set = permissions_for(Role::Support);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Permission::ViewOrders, Permission::ViewUsers]
        );
    }

    #[test]
    fn test_admin_is_superset_of_support() {
        assert!(permissions_for(Role::Admin).is_superset(permissions_for(Role::Support)));
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        assert!(permissions_for_named("owner").is_empty());
        for p in Permission::ALL {
            assert!(!has_permission_named("owner", p.as_str()));
        }
        assert!(!has_permission_named("", "view_orders"));
    }

    #[test]
    fn test_unknown_permission_fails_closed() {
        assert!(!has_permission_named("admin", "drop_tables"));
    }

    #[test]
    fn test_named_lookup_matches_typed_lookup() {
        for role in Role::ALL {
            for p in Permission::ALL {
                assert_eq!(
                    has_permission_named(role.as_str(), p.as_str()),
                    has_permission(role, p)
                );
            }
        }
    }

    #[test]
    fn test_convenience_predicates_follow_table() {
        for role in Role::ALL {
            assert_eq!(can_update_orders(role), has_permission(role, Permission::UpdateOrders));
            assert_eq!(can_update_users(role), has_permission(role, Permission::UpdateUsers));
        }
        assert!(can_update_orders(Role::Admin));
        assert!(!can_update_users(Role::Support));
    }
}
