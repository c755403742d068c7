//! Session middleware configuration.
//!
//! Sessions live in process memory: the shell holds nothing but the signed-in
//! identity and the backend bearer token, both of which the backend can
//! reissue at the next login.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ShellConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "erp_shell_session";

/// Session expiry after inactivity, in seconds (8 hours).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ShellConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
