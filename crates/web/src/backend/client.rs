//! HTTP client for the ERP backend.

use std::sync::Arc;
use std::time::Duration;

use erp_shell_core::{
    AccessTokenResponse, BackendUser, DashboardSummary, FinanceDashboard, InventoryAnalytics,
    LoginRequest, SalesAnalytics,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{AccessToken, BackendError};
use crate::config::BackendConfig;

/// Client for the ERP backend API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        // Url::join replaces the last segment unless the base ends with '/'
        let mut base_url = config.api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url,
                timeout: config.timeout,
            }),
        })
    }

    /// Bind this client to a user's bearer token.
    #[must_use]
    pub fn authorized(&self, token: AccessToken) -> AuthorizedClient {
        AuthorizedClient {
            client: self.clone(),
            token,
        }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` for bad credentials, or any
    /// transport error.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AccessTokenResponse, BackendError> {
        let url = self.endpoint("api/auth/login", &[])?;
        self.send(self.inner.client.post(url).json(request)).await
    }

    /// Fetch the identity of the token holder.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &AccessToken) -> Result<BackendUser, BackendError> {
        self.get("api/auth/me", &[], token).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &AccessToken,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path, query)?;
        self.send(self.inner.client.get(url).bearer_auth(token.expose()))
            .await
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let timeout = self.inner.timeout;
        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(e, timeout))?;

        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(e, timeout))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }
}

/// A [`BackendClient`] bound to one user's bearer token.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: BackendClient,
    token: AccessToken,
}

impl AuthorizedClient {
    /// Summary KPIs. The backend rejects non-privileged roles with 403.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Forbidden` for roles without access.
    #[instrument(skip(self))]
    pub async fn summary_kpis(&self) -> Result<DashboardSummary, BackendError> {
        self.client
            .get("api/auth/dashboard", &[], &self.token)
            .await
    }

    /// Inventory analytics.
    ///
    /// # Errors
    ///
    /// Returns any transport or status error.
    #[instrument(skip(self))]
    pub async fn inventory_analytics(&self) -> Result<InventoryAnalytics, BackendError> {
        self.client
            .get("api/inventory/analytics", &[], &self.token)
            .await
    }

    /// Sales analytics over the trailing `window_days`.
    ///
    /// # Errors
    ///
    /// Returns any transport or status error.
    #[instrument(skip(self))]
    pub async fn sales_analytics(&self, window_days: u32) -> Result<SalesAnalytics, BackendError> {
        self.client
            .get(
                "api/sales/analytics",
                &[("days", window_days.to_string())],
                &self.token,
            )
            .await
    }

    /// Finance aggregate over the trailing `window_days`.
    ///
    /// # Errors
    ///
    /// Returns any transport or status error.
    #[instrument(skip(self))]
    pub async fn finance_dashboard(
        &self,
        window_days: u32,
    ) -> Result<FinanceDashboard, BackendError> {
        self.client
            .get(
                "api/finance/dashboard",
                &[("days", window_days.to_string())],
                &self.token,
            )
            .await
    }
}

fn classify_transport(error: reqwest::Error, timeout: Duration) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout(timeout)
    } else {
        BackendError::Http(error)
    }
}

/// Map a non-success status to an error, keeping the backend's `detail` message.
fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::FORBIDDEN => BackendError::Forbidden(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => {
            tracing::warn!(status = %status, message = %message, "Backend returned non-success status");
            BackendError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}
