//! User roles and role sets used for navigation authorization.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Authorization level of a signed-in user.
///
/// Ordered from most to least privileged. `Staff` is the default and is
/// used whenever the backend reports no role or a role this shell does not
/// know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Full access, including the administration section.
    Admin,
    /// Store management without administration.
    Manager,
    /// Day-to-day operations.
    #[default]
    Staff,
}

impl Role {
    /// Every role, in enumeration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::Staff];

    /// Display name, matching the backend's `role_name` values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Staff => "Staff",
        }
    }

    /// Resolve an optional role name, degrading to [`Role::Staff`].
    ///
    /// Missing, blank and unrecognized names all resolve to the
    /// least-privileged role instead of failing.
    ///
    /// ```
    /// use erp_shell_core::Role;
    ///
    /// assert_eq!(Role::from_name(Some("Admin")), Role::Admin);
    /// assert_eq!(Role::from_name(Some("manager")), Role::Manager);
    /// assert_eq!(Role::from_name(Some("Owner")), Role::Staff);
    /// assert_eq!(Role::from_name(None), Role::Staff);
    /// ```
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        name.and_then(|n| n.parse().ok()).unwrap_or_default()
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Admin => 0b001,
            Self::Manager => 0b010,
            Self::Staff => 0b100,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("invalid role: {s}"))
    }
}

/// An immutable, non-empty set of roles.
///
/// Built at compile time for the static navigation catalog; an empty set is
/// rejected during const evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Every role.
    pub const ALL: Self = Self::of(&Role::ALL);

    /// Build a set from a non-empty list of roles.
    ///
    /// # Panics
    ///
    /// Panics if `roles` is empty. In a `const` item this is a compile error.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // bounded by the loop condition
    pub const fn of(roles: &[Role]) -> Self {
        assert!(!roles.is_empty(), "a role set must allow at least one role");
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Whether `role` is a member of this set.
    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default_is_staff() {
        assert_eq!(Role::default(), Role::Staff);
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" staff ".parse::<Role>(), Ok(Role::Staff));
        assert!("super_admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_from_name_degrades_to_staff() {
        assert_eq!(Role::from_name(Some("")), Role::Staff);
        assert_eq!(Role::from_name(Some("Viewer")), Role::Staff);
        assert_eq!(Role::from_name(Some("Manager")), Role::Manager);
    }

    #[test]
    fn test_role_serde_uses_display_names() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"Manager\"");
        let role: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_role_set_membership() {
        let admin_only = RoleSet::of(&[Role::Admin]);
        assert!(admin_only.contains(Role::Admin));
        assert!(!admin_only.contains(Role::Manager));
        assert!(!admin_only.contains(Role::Staff));

        for role in Role::ALL {
            assert!(RoleSet::ALL.contains(role));
        }
    }

    #[test]
    fn test_role_set_ignores_duplicates() {
        let set = RoleSet::of(&[Role::Staff, Role::Admin, Role::Staff]);
        assert_eq!(set, RoleSet::of(&[Role::Admin, Role::Staff]));
        assert!(!set.contains(Role::Manager));
    }

    #[test]
    #[should_panic(expected = "at least one role")]
    fn test_role_set_rejects_empty() {
        let _ = RoleSet::of(&[]);
    }
}
