//! ERP backend API client.
//!
//! The backend owns every business subsystem (auth, inventory, sales,
//! finance). The shell only reads their summary endpoints and forwards login
//! credentials.
//!
//! # Endpoints
//!
//! ```text
//! POST /api/auth/login              - Exchange credentials for a bearer token
//! GET  /api/auth/me                 - Identity of the token holder
//! GET  /api/auth/dashboard          - Summary KPIs (privileged roles only)
//! GET  /api/inventory/analytics     - Inventory analytics
//! GET  /api/sales/analytics?days=N  - Sales analytics over a trailing window
//! GET  /api/finance/dashboard?days=N - Finance aggregate over a trailing window
//! ```

pub mod client;

pub use client::{AuthorizedClient, BackendClient};

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur when interacting with the ERP backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The token holder's role may not read this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Detail message from the response body, if any.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request did not complete in time.
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, timeouts, rate limiting and 5xx responses are
    /// transient. Authorization failures and malformed payloads are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Unauthorized
            | Self::Forbidden(_)
            | Self::NotFound(_)
            | Self::Parse(_)
            | Self::Url(_) => false,
        }
    }
}

/// Bearer token issued by the backend for the signed-in user.
///
/// The token value never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for building the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
