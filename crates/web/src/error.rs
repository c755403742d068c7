//! Errors returned by request handlers.
//!
//! Dashboard sources never surface here; each one degrades to its own
//! placeholder. What remains is sign-in plumbing and section gating.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use erp_shell_core::Role;
use thiserror::Error;

use crate::backend::BackendError;

/// Handler error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Sign-in could not reach the backend or got an unusable answer.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The session store rejected a write.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// No catalog entry has this path.
    #[error("No section at {0}")]
    UnknownSection(String),

    /// The catalog entry exists but excludes the user's role.
    #[error("{section} is not available to the {role} role")]
    SectionDenied { section: &'static str, role: Role },
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Backend(BackendError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnknownSection(_) => StatusCode::NOT_FOUND,
            Self::SectionDenied { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !status.is_server_error() {
            return (status, self.to_string()).into_response();
        }

        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Shell request error"
        );

        // Backend and session details stay in the logs
        let message = match self {
            Self::Session(_) => "Internal server error",
            _ => "ERP backend unavailable",
        };
        (status, message).into_response()
    }
}

/// Set the Sentry user context for the signed-in user.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
