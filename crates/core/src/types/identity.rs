//! Identity payloads exchanged with the backend's auth endpoints.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Credentials forwarded to `POST /api/auth/login`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token issued on successful login.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// The authenticated user as reported by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUser {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Free-form role name; see [`BackendUser::role`].
    #[serde(default)]
    pub role_name: Option<String>,
}

impl BackendUser {
    /// The user's role, degrading to [`Role::Staff`] when unset or unknown.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_name(self.role_name.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "ops@example.com".to_string(),
            password: "hunter2-but-longer".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("ops@example.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let token: AccessTokenResponse =
            serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert!(!format!("{token:?}").contains("abc"));
    }

    #[test]
    fn test_backend_user_role_resolution() {
        let user: BackendUser =
            serde_json::from_str(r#"{"email": "a@example.com", "role_name": "Manager"}"#).unwrap();
        assert_eq!(user.role(), Role::Manager);

        let user: BackendUser = serde_json::from_str(r#"{"email": "b@example.com"}"#).unwrap();
        assert_eq!(user.role(), Role::Staff);

        let user: BackendUser =
            serde_json::from_str(r#"{"email": "c@example.com", "role_name": "Auditor"}"#).unwrap();
        assert_eq!(user.role(), Role::Staff);
    }
}
