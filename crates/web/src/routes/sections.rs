//! Role-gated section pages.
//!
//! Every catalog entry other than the dashboard gets a page inside the
//! navigation frame. The business subsystems behind them are served
//! elsewhere; the shell only enforces who may open each entry.

use askama::Template;
use axum::{Router, http::Uri, response::Html, routing::get};
use tracing::instrument;

use crate::components::NavFrame;
use crate::components::nav::{CATALOG, NavEntry, find_entry};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Section page template.
#[derive(Template)]
#[template(path = "section.html")]
pub struct SectionTemplate {
    pub frame: NavFrame,
    pub label: &'static str,
    pub path: &'static str,
}

/// Build the section router from the catalog.
pub fn router() -> Router<AppState> {
    CATALOG
        .iter()
        .filter(|entry| entry.path != "/")
        .fold(Router::new(), |router, entry| {
            router.route(entry.path, get(section))
        })
}

/// Resolve the catalog entry for `path` and check `user` may open it.
///
/// # Errors
///
/// Returns `AppError::UnknownSection` for paths outside the catalog and
/// `AppError::SectionDenied` when the entry does not allow the user's role.
pub fn authorize_entry(user: &CurrentUser, path: &str) -> Result<&'static NavEntry, AppError> {
    let entry = find_entry(path).ok_or_else(|| AppError::UnknownSection(path.to_string()))?;

    if !entry.allows(user.role) {
        tracing::warn!(
            email = %user.email,
            role = %user.role,
            path,
            "Section access denied"
        );
        return Err(AppError::SectionDenied {
            section: entry.label,
            role: user.role,
        });
    }

    Ok(entry)
}

/// Section page handler.
///
/// GET /inventory, /sales, /employees, /finance, /admin, /ai-chat
#[instrument(skip_all, fields(path = %uri.path()))]
async fn section(RequireUser(user): RequireUser, uri: Uri) -> Result<Html<String>, AppError> {
    let entry = authorize_entry(&user, uri.path())?;

    let template = SectionTemplate {
        frame: NavFrame::build(Some(&user), entry.path),
        label: entry.label,
        path: entry.path,
    };

    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use erp_shell_core::Role;

    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            email: "someone@example.com".to_string(),
            role,
            signed_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_section_requires_admin() {
        assert!(matches!(
            authorize_entry(&user(Role::Manager), "/admin"),
            Err(AppError::SectionDenied {
                section: "Admin",
                role: Role::Manager
            })
        ));
        assert_eq!(
            authorize_entry(&user(Role::Admin), "/admin").unwrap().label,
            "Admin"
        );
    }

    #[test]
    fn test_shared_sections_open_to_staff() {
        for path in ["/inventory", "/sales", "/employees", "/finance", "/ai-chat"] {
            assert!(authorize_entry(&user(Role::Staff), path).is_ok(), "{path}");
        }
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        assert!(matches!(
            authorize_entry(&user(Role::Admin), "/payroll"),
            Err(AppError::UnknownSection(_))
        ));
    }
}
