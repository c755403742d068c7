//! HTTP middleware stack for the shell.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Auth extractors (per handler)

pub mod auth;
pub mod session;

pub use auth::{Authenticated, OptionalUser, RequireUser, sign_in, sign_out};
pub use session::create_session_layer;
