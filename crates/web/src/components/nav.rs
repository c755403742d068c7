//! Role-gated navigation.
//!
//! The catalog is fixed at build time. Each entry carries the set of roles
//! allowed to see it, and the frame shows the catalog filtered down to the
//! current user's role, in catalog order.

use erp_shell_core::{Role, RoleSet};
use serde::Serialize;

use crate::models::{CurrentUser, FALLBACK_DISPLAY_NAME};

/// Application title shown at the top of the frame.
pub const APP_TITLE: &str = "ERP System";

/// Symbolic icon reference; the stylesheet maps names to glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIcon {
    LayoutDashboard,
    Package,
    ShoppingCart,
    Users,
    DollarSign,
    Settings,
    MessageSquare,
}

impl NavIcon {
    /// Icon name as used in templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LayoutDashboard => "layout-dashboard",
            Self::Package => "package",
            Self::ShoppingCart => "shopping-cart",
            Self::Users => "users",
            Self::DollarSign => "dollar-sign",
            Self::Settings => "settings",
            Self::MessageSquare => "message-square",
        }
    }
}

/// One entry of the static navigation catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    /// Route path, compared exactly against the current path.
    pub path: &'static str,
    /// Link text.
    pub label: &'static str,
    /// Link icon.
    pub icon: NavIcon,
    /// Roles allowed to see and open this entry.
    pub allowed: RoleSet,
}

impl NavEntry {
    /// Whether `role` may see this entry.
    #[must_use]
    pub const fn allows(&self, role: Role) -> bool {
        self.allowed.contains(role)
    }
}

/// The navigation catalog, in display order.
pub const CATALOG: &[NavEntry] = &[
    NavEntry {
        path: "/",
        label: "Dashboard",
        icon: NavIcon::LayoutDashboard,
        allowed: RoleSet::ALL,
    },
    NavEntry {
        path: "/inventory",
        label: "Inventory",
        icon: NavIcon::Package,
        allowed: RoleSet::ALL,
    },
    NavEntry {
        path: "/sales",
        label: "Sales",
        icon: NavIcon::ShoppingCart,
        allowed: RoleSet::ALL,
    },
    NavEntry {
        path: "/employees",
        label: "Employees",
        icon: NavIcon::Users,
        allowed: RoleSet::ALL,
    },
    NavEntry {
        path: "/finance",
        label: "Finance",
        icon: NavIcon::DollarSign,
        allowed: RoleSet::ALL,
    },
    NavEntry {
        path: "/admin",
        label: "Admin",
        icon: NavIcon::Settings,
        allowed: RoleSet::of(&[Role::Admin]),
    },
    NavEntry {
        path: "/ai-chat",
        label: "AI Assistant",
        icon: NavIcon::MessageSquare,
        allowed: RoleSet::ALL,
    },
];

/// Entries of `catalog` visible to `role`, in catalog order.
#[must_use]
pub fn visible_items(role: Role, catalog: &[NavEntry]) -> Vec<&NavEntry> {
    catalog.iter().filter(|entry| entry.allows(role)).collect()
}

/// Look up the catalog entry for an exact path.
#[must_use]
pub fn find_entry(path: &str) -> Option<&'static NavEntry> {
    CATALOG.iter().find(|entry| entry.path == path)
}

/// A visible link, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Set on the link whose path equals the current route.
    pub active: bool,
}

/// The persistent frame around every signed-in page.
#[derive(Debug, Clone, Serialize)]
pub struct NavFrame {
    pub title: &'static str,
    pub links: Vec<NavLink>,
    pub user_name: String,
    pub role: Role,
}

impl NavFrame {
    /// Build the frame for `user` on `current_path` from [`CATALOG`].
    ///
    /// An absent user is treated as [`Role::Staff`].
    #[must_use]
    pub fn build(user: Option<&CurrentUser>, current_path: &str) -> Self {
        Self::from_catalog(CATALOG, user, current_path)
    }

    /// Build the frame from an arbitrary catalog.
    #[must_use]
    pub fn from_catalog(
        catalog: &[NavEntry],
        user: Option<&CurrentUser>,
        current_path: &str,
    ) -> Self {
        let role = user.map(|u| u.role).unwrap_or_default();
        let links = visible_items(role, catalog)
            .into_iter()
            .map(|entry| NavLink {
                path: entry.path,
                label: entry.label,
                icon: entry.icon.as_str(),
                active: entry.path == current_path,
            })
            .collect();

        Self {
            title: APP_TITLE,
            links,
            user_name: user.map_or(FALLBACK_DISPLAY_NAME, CurrentUser::display_name).to_string(),
            role,
        }
    }

    /// Role label shown under the user name.
    #[must_use]
    pub const fn role_label(&self) -> &'static str {
        self.role.as_str()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            email: "someone@example.com".to_string(),
            role,
            signed_in_at: Utc::now(),
        }
    }

    fn paths(entries: &[&NavEntry]) -> Vec<&'static str> {
        entries.iter().map(|entry| entry.path).collect()
    }

    #[test]
    fn test_visible_items_is_order_preserving_filter() {
        for role in Role::ALL {
            let visible = visible_items(role, CATALOG);
            let expected: Vec<&NavEntry> =
                CATALOG.iter().filter(|e| e.allowed.contains(role)).collect();
            assert_eq!(visible, expected);

            let mut seen = paths(&visible);
            seen.dedup();
            assert_eq!(seen.len(), visible.len());
        }
    }

    #[test]
    fn test_admin_entry_hidden_from_manager_and_staff() {
        let manager = paths(&visible_items(Role::Manager, CATALOG));
        assert!(!manager.contains(&"/admin"));
        assert_eq!(manager.len(), CATALOG.len() - 1);

        let staff = paths(&visible_items(Role::Staff, CATALOG));
        assert_eq!(staff, manager);

        let admin = paths(&visible_items(Role::Admin, CATALOG));
        assert!(admin.contains(&"/admin"));
        assert_eq!(admin.len(), CATALOG.len());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = [
            NavEntry {
                path: "/reports",
                label: "Reports",
                icon: NavIcon::DollarSign,
                allowed: RoleSet::of(&[Role::Admin, Role::Manager]),
            },
            NavEntry {
                path: "/",
                label: "Home",
                icon: NavIcon::LayoutDashboard,
                allowed: RoleSet::ALL,
            },
        ];
        assert_eq!(paths(&visible_items(Role::Manager, &catalog)), vec!["/reports", "/"]);
        assert_eq!(paths(&visible_items(Role::Staff, &catalog)), vec!["/"]);
    }

    #[test]
    fn test_frame_without_user_matches_staff() {
        let anonymous = NavFrame::build(None, "/");
        let staff = NavFrame::build(Some(&user(Role::Staff)), "/");

        let anonymous_paths: Vec<_> = anonymous.links.iter().map(|l| l.path).collect();
        let staff_paths: Vec<_> = staff.links.iter().map(|l| l.path).collect();
        assert_eq!(anonymous_paths, staff_paths);
        assert_eq!(anonymous.user_name, "User");
        assert_eq!(anonymous.role_label(), "Staff");
    }

    #[test]
    fn test_frame_flags_at_most_one_active_link() {
        let frame = NavFrame::build(Some(&user(Role::Admin)), "/sales");
        let active: Vec<_> = frame.links.iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().unwrap().path, "/sales");

        // Prefix matches do not count
        let frame = NavFrame::build(Some(&user(Role::Admin)), "/sales/orders");
        assert!(frame.links.iter().all(|l| !l.active));

        // Hidden entries are never active
        let frame = NavFrame::build(Some(&user(Role::Manager)), "/admin");
        assert!(frame.links.iter().all(|l| !l.active));
    }

    #[test]
    fn test_frame_shows_user_and_role() {
        let frame = NavFrame::build(Some(&user(Role::Manager)), "/");
        assert_eq!(frame.title, "ERP System");
        assert_eq!(frame.user_name, "someone@example.com");
        assert_eq!(frame.role_label(), "Manager");
    }

    #[test]
    fn test_find_entry_is_exact() {
        assert_eq!(find_entry("/admin").unwrap().label, "Admin");
        assert!(find_entry("/admin/").is_none());
        assert!(find_entry("/unknown").is_none());
    }
}
