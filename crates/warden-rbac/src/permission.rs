//! Permissions and permission sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::RbacError;

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// A named capability that can be granted per role.
///
/// Wire names are snake_case (`"update_orders"`), matching what the
/// portal's UI components ask for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewOrders,
    UpdateOrders,
    ViewUsers,
    UpdateUsers,
    ViewAnalytics,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 5] = [
        Permission::ViewOrders,
        Permission::UpdateOrders,
        Permission::ViewUsers,
        Permission::UpdateUsers,
        Permission::ViewAnalytics,
    ];

    /// The wire name of this permission.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewOrders => "view_orders",
            Self::UpdateOrders => "update_orders",
            Self::ViewUsers => "view_users",
            Self::UpdateUsers => "update_users",
            Self::ViewAnalytics => "view_analytics",
        }
    }

    /// The bit this permission occupies in a [`PermissionSet`].
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RbacError::UnknownPermission(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PermissionSet
// ---------------------------------------------------------------------------

/// An immutable set of permissions.
///
/// With only five permissions the whole set fits in one byte, which lets
/// the role table be built at compile time (`const`) and copied freely.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionSet(u8);

impl PermissionSet {
    /// The empty set. What unknown roles get.
    pub const EMPTY: PermissionSet = PermissionSet(0);

    /// Builds a set from a list of permissions.
    ///
    /// `const fn` can't use iterators, hence the `while` loop.
    pub const fn of(permissions: &[Permission]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < permissions.len() {
            bits |= permissions[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns `true` if `permission` is in the set.
    pub fn contains(self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// Returns `true` if every permission of `other` is also in `self`.
    pub fn is_superset(self, other: PermissionSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of permissions in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the set grants nothing.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the permissions in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Serialized as a plain list of names: `["view_orders", "view_users"]`.
impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_from_str_round_trips_every_name() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
    }

    #[test]
    fn test_permission_from_str_unknown_returns_error() {
        let err = "delete_everything".parse::<Permission>().unwrap_err();
        assert!(matches!(err, RbacError::UnknownPermission(ref s) if s == "delete_everything"));
    }

    #[test]
    fn test_permission_set_contains_only_members() {
        let set = PermissionSet::of(&[Permission::ViewOrders, Permission::ViewUsers]);
        assert!(set.contains(Permission::ViewOrders));
        assert!(set.contains(Permission::ViewUsers));
        assert!(!set.contains(Permission::UpdateOrders));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_permission_set_superset() {
        let all = PermissionSet::of(&Permission::ALL);
        let some = PermissionSet::of(&[Permission::ViewAnalytics]);
        assert!(all.is_superset(some));
        assert!(!some.is_superset(all));
        assert!(some.is_superset(PermissionSet::EMPTY));
    }

    #[test]
    fn test_permission_set_serializes_as_name_list() {
        let set = PermissionSet::of(&[Permission::UpdateUsers, Permission::ViewOrders]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["view_orders","update_users"]"#);
    }

    #[test]
    fn test_empty_set_is_empty() {
        assert!(PermissionSet::EMPTY.is_empty());
        assert_eq!(PermissionSet::EMPTY.iter().count(), 0);
        assert_eq!(PermissionSet::default(), PermissionSet::EMPTY);
    }
}
