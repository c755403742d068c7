//! HTTP route handlers for the shell.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth (credentials forwarded to the ERP backend)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out
//!
//! # Dashboard
//! GET  /                       - Dashboard overview
//! GET  /api/dashboard          - Dashboard view as JSON
//! GET  /api/dashboard/stream   - Dashboard view updates (SSE)
//!
//! # Sections (role-gated, one per catalog entry)
//! GET  /inventory, /sales, /employees, /finance, /admin, /ai-chat
//! ```

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod dashboard;
pub mod sections;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(sections::router())
}
