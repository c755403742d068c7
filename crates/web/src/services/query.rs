//! Keyed query cache with per-source retry policies.
//!
//! Every dashboard fetch goes through [`QueryCache::fetch`]:
//!
//! - Results are cached under a [`QueryKey`] (user scope + source + parameters)
//!   using `moka` with a configurable TTL. A cached key is never re-fetched.
//! - Concurrent fetches of the same key share one in-flight request.
//! - Failures are never cached; the next render tries again.
//! - Each attempt is bounded by an explicit timeout, and transient failures
//!   are retried with exponential backoff according to the caller's
//!   [`RetryPolicy`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use erp_shell_core::{DashboardSummary, FinanceDashboard, InventoryAnalytics, SalesAnalytics};
use moka::future::Cache;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::config::QueryConfig;

/// Upper bound on cached entries per source.
const MAX_ENTRIES_PER_SOURCE: u64 = 10_000;

/// A backend data source plus the parameters it was queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuerySource {
    SummaryKpis,
    InventoryAnalytics,
    SalesAnalytics { window_days: u32 },
    FinanceDashboard { window_days: u32 },
}

impl QuerySource {
    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SummaryKpis => "summary_kpis",
            Self::InventoryAnalytics => "inventory_analytics",
            Self::SalesAnalytics { .. } => "sales_analytics",
            Self::FinanceDashboard { .. } => "finance_dashboard",
        }
    }
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SummaryKpis | Self::InventoryAnalytics => f.write_str(self.name()),
            Self::SalesAnalytics { window_days } | Self::FinanceDashboard { window_days } => {
                write!(f, "{}({window_days}d)", self.name())
            }
        }
    }
}

/// Cache identity of one query.
///
/// `scope` identifies whose credentials the data was fetched with, so one
/// user's cached results are never served to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub scope: Arc<str>,
    pub source: QuerySource,
}

impl QueryKey {
    /// Create a key for `source` fetched on behalf of `scope`.
    #[must_use]
    pub fn new(scope: impl Into<Arc<str>>, source: QuerySource) -> Self {
        Self {
            scope: scope.into(),
            source,
        }
    }
}

/// How often, and how patiently, a failed fetch is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Fail on the first error.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    /// Cap applied to the exponential backoff.
    pub const MAX_DELAY: Duration = Duration::from_secs(30);

    /// Default policy for sources that allow retry.
    #[must_use]
    pub const fn from_config(config: &QueryConfig) -> Self {
        Self {
            max_retries: config.retry_attempts,
            base_delay: config.retry_base_delay,
            max_delay: Self::MAX_DELAY,
        }
    }

    /// Delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry))
            .min(self.max_delay)
    }
}

/// Payload types that have their own cache in [`QueryCache`].
pub trait Cached: Send + Sync + Sized + 'static {
    /// The cache holding values of this type.
    fn store(queries: &QueryCache) -> &Cache<QueryKey, Arc<Self>>;
}

macro_rules! cached_in {
    ($ty:ty, $field:ident) => {
        impl Cached for $ty {
            fn store(queries: &QueryCache) -> &Cache<QueryKey, Arc<Self>> {
                &queries.inner.$field
            }
        }
    };
}

cached_in!(DashboardSummary, summaries);
cached_in!(InventoryAnalytics, inventory);
cached_in!(SalesAnalytics, sales);
cached_in!(FinanceDashboard, finance);

/// Shared cache of dashboard query results.
///
/// Cheap to clone; all clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    summaries: Cache<QueryKey, Arc<DashboardSummary>>,
    inventory: Cache<QueryKey, Arc<InventoryAnalytics>>,
    sales: Cache<QueryKey, Arc<SalesAnalytics>>,
    finance: Cache<QueryKey, Arc<FinanceDashboard>>,
}

fn build_cache<V>(ttl: Duration) -> Cache<QueryKey, V>
where
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(MAX_ENTRIES_PER_SOURCE)
        .time_to_live(ttl)
        .support_invalidation_closures()
        .build()
}

impl QueryCache {
    /// Create an empty cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(QueryCacheInner {
                summaries: build_cache(ttl),
                inventory: build_cache(ttl),
                sales: build_cache(ttl),
                finance: build_cache(ttl),
            }),
        }
    }

    /// Return the cached value for `key`, or run `fetch` to produce it.
    ///
    /// Each attempt is bounded by `timeout`. Transient failures are retried
    /// according to `policy`; the final error is returned and not cached.
    ///
    /// # Errors
    ///
    /// Returns the last `BackendError` once retries are exhausted or the
    /// error is not transient.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        policy: RetryPolicy,
        timeout: Duration,
        fetch: F,
    ) -> Result<Arc<T>, Arc<BackendError>>
    where
        T: Cached,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BackendError>> + Send,
    {
        let source = key.source;
        T::store(self)
            .try_get_with(key, async move {
                run_with_retry(source, policy, timeout, fetch)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// Drop every cached result fetched on behalf of `scope`.
    pub fn invalidate_scope(&self, scope: &str) {
        let scope: Arc<str> = Arc::from(scope);
        evict(&self.inner.summaries, &scope);
        evict(&self.inner.inventory, &scope);
        evict(&self.inner.sales, &scope);
        evict(&self.inner.finance, &scope);
    }
}

fn evict<V>(cache: &Cache<QueryKey, V>, scope: &Arc<str>)
where
    V: Clone + Send + Sync + 'static,
{
    let scope = Arc::clone(scope);
    if let Err(e) = cache.invalidate_entries_if(move |key, _| key.scope == scope) {
        tracing::error!(error = %e, "Failed to invalidate cached queries");
    }
}

async fn run_with_retry<T, F, Fut>(
    source: QuerySource,
    policy: RetryPolicy,
    timeout: Duration,
    mut fetch: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut retry = 0;
    loop {
        let outcome = tokio::time::timeout(timeout, fetch())
            .await
            .unwrap_or_else(|_| Err(BackendError::Timeout(timeout)));

        match outcome {
            Ok(value) => {
                debug!(source = %source, attempts = retry + 1, "Query resolved");
                return Ok(value);
            }
            Err(error) if retry < policy.max_retries && error.is_transient() => {
                let delay = policy.delay_for(retry);
                warn!(
                    source = %source,
                    attempt = retry + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "Query failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
