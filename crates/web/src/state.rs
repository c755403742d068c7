//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{AccessToken, AuthorizedClient, BackendClient, BackendError};
use crate::config::ShellConfig;
use crate::services::{AggregatorSettings, DashboardAggregator, QueryCache, RetryPolicy};

/// Application state shared across all handlers.
///
/// Cheap to clone; holds the backend client and the query cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShellConfig,
    backend: BackendClient,
    queries: QueryCache,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend HTTP client cannot be built.
    pub fn new(config: ShellConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let queries = QueryCache::new(config.query.cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                queries,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the query cache.
    #[must_use]
    pub fn queries(&self) -> &QueryCache {
        &self.inner.queries
    }

    /// Aggregator fetching the dashboard with `token`, cached under `scope`.
    #[must_use]
    pub fn dashboard(&self, scope: &str, token: AccessToken) -> DashboardAggregator<AuthorizedClient> {
        let config = self.config();
        DashboardAggregator::new(
            self.backend().authorized(token),
            self.queries().clone(),
            scope,
            AggregatorSettings {
                window_days: config.dashboard.window_days,
                timeout: config.backend.timeout,
                retry: RetryPolicy::from_config(&config.query),
                render_deadline: config.dashboard.render_deadline,
            },
        )
    }
}
