//! Session-stored identity of the signed-in user.

use chrono::{DateTime, SecondsFormat, Utc};
use erp_shell_core::{BackendUser, Role};
use serde::{Deserialize, Serialize};

/// Shown in the frame when the session carries no email.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Session-stored user identity.
///
/// Created when the backend accepts a login, removed on logout. Never
/// mutated in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Email reported by the backend.
    pub email: String,
    /// Resolved authorization level.
    pub role: Role,
    /// When the session was established.
    pub signed_in_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Build the session identity from the backend's `/api/auth/me` answer.
    #[must_use]
    pub fn from_backend(user: &BackendUser, signed_in_at: DateTime<Utc>) -> Self {
        Self {
            email: user.email.trim().to_string(),
            role: user.role(),
            signed_in_at,
        }
    }

    /// Name shown in the navigation frame.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.email.is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            &self.email
        }
    }

    /// Cache scope of this sign-in.
    ///
    /// Distinct for every sign-in of the same email, so results fetched with
    /// an earlier session's token are never served to a later one.
    #[must_use]
    pub fn cache_scope(&self) -> String {
        format!(
            "{}#{}",
            self.email,
            self.signed_in_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
        )
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend bearer token of the current user.
    pub const ACCESS_TOKEN: &str = "access_token";
}
