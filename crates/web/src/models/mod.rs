//! Domain models for the shell.

pub mod session;

pub use session::{CurrentUser, FALLBACK_DISPLAY_NAME, keys as session_keys};
