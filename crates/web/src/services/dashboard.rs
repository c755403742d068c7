//! Dashboard aggregation over four independent backend sources.
//!
//! The aggregator issues the summary, inventory, sales and finance queries
//! concurrently. Each result lands in its own [`Slot`] of a
//! [`DashboardSnapshot`]; a failing or slow source never holds back the
//! others. Derivation of the displayed tiles and panels lives in
//! [`crate::components::dashboard`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use erp_shell_core::{DashboardSummary, FinanceDashboard, InventoryAnalytics, SalesAnalytics};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::query::{QueryCache, QueryKey, QuerySource, RetryPolicy};
use crate::backend::{AuthorizedClient, BackendError};

/// The four fetches behind the dashboard.
pub trait DashboardSource: Send + Sync {
    /// Summary KPIs; may be refused for non-privileged roles.
    fn summary_kpis(
        &self,
    ) -> impl Future<Output = Result<DashboardSummary, BackendError>> + Send;

    /// Inventory analytics.
    fn inventory_analytics(
        &self,
    ) -> impl Future<Output = Result<InventoryAnalytics, BackendError>> + Send;

    /// Ranked product sales over the trailing window.
    fn sales_analytics(
        &self,
        window_days: u32,
    ) -> impl Future<Output = Result<SalesAnalytics, BackendError>> + Send;

    /// Revenue, expenses and profit over the trailing window.
    fn finance_dashboard(
        &self,
        window_days: u32,
    ) -> impl Future<Output = Result<FinanceDashboard, BackendError>> + Send;
}

impl DashboardSource for AuthorizedClient {
    async fn summary_kpis(&self) -> Result<DashboardSummary, BackendError> {
        Self::summary_kpis(self).await
    }

    async fn inventory_analytics(&self) -> Result<InventoryAnalytics, BackendError> {
        Self::inventory_analytics(self).await
    }

    async fn sales_analytics(&self, window_days: u32) -> Result<SalesAnalytics, BackendError> {
        Self::sales_analytics(self, window_days).await
    }

    async fn finance_dashboard(&self, window_days: u32) -> Result<FinanceDashboard, BackendError> {
        Self::finance_dashboard(self, window_days).await
    }
}

/// Coarse state of one source, for JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Pending,
    Loaded,
    Unavailable,
}

/// The outcome of one source's fetch.
///
/// `Unavailable` covers every failure (authorization, exhausted retries,
/// timeout); the reason is logged, never displayed.
#[derive(Debug)]
pub enum Slot<T> {
    /// Not settled yet.
    Pending,
    /// Data arrived.
    Loaded(Arc<T>),
    /// The fetch failed.
    Unavailable,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Loaded(value) => Self::Loaded(Arc::clone(value)),
            Self::Unavailable => Self::Unavailable,
        }
    }
}

impl<T> Slot<T> {
    /// The data, if it arrived.
    #[must_use]
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Pending | Self::Unavailable => None,
        }
    }

    /// Coarse state of this slot.
    #[must_use]
    pub const fn state(&self) -> SlotState {
        match self {
            Self::Pending => SlotState::Pending,
            Self::Loaded(_) => SlotState::Loaded,
            Self::Unavailable => SlotState::Unavailable,
        }
    }

    /// Whether the fetch has resolved either way.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    fn settle(source: QuerySource, result: Result<Arc<T>, Arc<BackendError>>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            // Expected for roles without access to the summary
            Err(error) if source == QuerySource::SummaryKpis => {
                debug!(source = %source, error = %error, "Summary KPIs unavailable, showing zeros");
                Self::Unavailable
            }
            Err(error) => {
                warn!(source = %source, error = %error, "Dashboard source unavailable");
                Self::Unavailable
            }
        }
    }
}

/// Render-local aggregate of the four sources.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub summary: Slot<DashboardSummary>,
    pub inventory: Slot<InventoryAnalytics>,
    pub sales: Slot<SalesAnalytics>,
    pub finance: Slot<FinanceDashboard>,
}

impl DashboardSnapshot {
    /// Snapshot before any source has settled.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            summary: Slot::Pending,
            inventory: Slot::Pending,
            sales: Slot::Pending,
            finance: Slot::Pending,
        }
    }

    /// Whether every source has settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.summary.is_settled()
            && self.inventory.is_settled()
            && self.sales.is_settled()
            && self.finance.is_settled()
    }

    fn apply(&mut self, update: SlotUpdate) {
        match update {
            SlotUpdate::Summary(slot) => self.summary = slot,
            SlotUpdate::Inventory(slot) => self.inventory = slot,
            SlotUpdate::Sales(slot) => self.sales = slot,
            SlotUpdate::Finance(slot) => self.finance = slot,
        }
    }
}

enum SlotUpdate {
    Summary(Slot<DashboardSummary>),
    Inventory(Slot<InventoryAnalytics>),
    Sales(Slot<SalesAnalytics>),
    Finance(Slot<FinanceDashboard>),
}

/// Tunables for one aggregation.
#[derive(Debug, Clone, Copy)]
pub struct AggregatorSettings {
    /// Trailing window for sales and finance
    pub window_days: u32,
    /// Upper bound on each fetch attempt
    pub timeout: Duration,
    /// Retry policy for inventory, sales and finance
    pub retry: RetryPolicy,
    /// How long [`DashboardAggregator::snapshot`] waits for sources
    pub render_deadline: Duration,
}

/// Fetches the dashboard sources on behalf of one user.
#[derive(Clone)]
pub struct DashboardAggregator<S> {
    source: S,
    queries: QueryCache,
    scope: Arc<str>,
    settings: AggregatorSettings,
}

impl<S: DashboardSource> DashboardAggregator<S> {
    /// Create an aggregator reading from `source`, caching in `queries`
    /// under `scope` (the signed-in user).
    #[must_use]
    pub fn new(
        source: S,
        queries: QueryCache,
        scope: impl Into<Arc<str>>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            source,
            queries,
            scope: scope.into(),
            settings,
        }
    }

    /// The best snapshot available once every source settled or the render
    /// deadline passed, whichever comes first.
    ///
    /// Never fails: every failed source becomes [`Slot::Unavailable`], and
    /// sources still running at the deadline stay [`Slot::Pending`] and are
    /// dropped.
    #[instrument(skip(self), fields(scope = %self.scope))]
    pub async fn snapshot(self) -> DashboardSnapshot {
        let deadline = tokio::time::sleep(self.settings.render_deadline);
        let mut updates = Box::pin(self.updates());
        tokio::pin!(deadline);

        let mut latest = DashboardSnapshot::pending();
        loop {
            tokio::select! {
                next = updates.next() => match next {
                    Some(snapshot) => latest = snapshot,
                    None => break,
                },
                () = &mut deadline => {
                    debug!(
                        summary = ?latest.summary.state(),
                        inventory = ?latest.inventory.state(),
                        sales = ?latest.sales.state(),
                        finance = ?latest.finance.state(),
                        "Render deadline reached with sources pending"
                    );
                    break;
                }
            }
        }
        latest
    }

    /// Stream the snapshot as it fills in.
    ///
    /// Yields the all-pending snapshot first, then one snapshot each time a
    /// source settles, in completion order. Ends once all four settled.
    /// Dropping the stream cancels the fetches still in flight.
    pub fn updates(self) -> impl Stream<Item = DashboardSnapshot> + Send {
        stream! {
            let mut snapshot = DashboardSnapshot::pending();
            yield snapshot.clone();

            let mut in_flight = FuturesUnordered::new();
            in_flight.push(self.summary().map(SlotUpdate::Summary).boxed());
            in_flight.push(self.inventory().map(SlotUpdate::Inventory).boxed());
            in_flight.push(self.sales().map(SlotUpdate::Sales).boxed());
            in_flight.push(self.finance().map(SlotUpdate::Finance).boxed());

            while let Some(update) = in_flight.next().await {
                snapshot.apply(update);
                yield snapshot.clone();
            }
        }
    }

    fn key(&self, source: QuerySource) -> QueryKey {
        QueryKey::new(Arc::clone(&self.scope), source)
    }

    async fn summary(&self) -> Slot<DashboardSummary> {
        let source = QuerySource::SummaryKpis;
        // Refusal here usually means the role lacks access; retrying cannot help
        let result = self
            .queries
            .fetch(self.key(source), RetryPolicy::NONE, self.settings.timeout, || {
                self.source.summary_kpis()
            })
            .await;
        Slot::settle(source, result)
    }

    async fn inventory(&self) -> Slot<InventoryAnalytics> {
        let source = QuerySource::InventoryAnalytics;
        let result = self
            .queries
            .fetch(self.key(source), self.settings.retry, self.settings.timeout, || {
                self.source.inventory_analytics()
            })
            .await;
        Slot::settle(source, result)
    }

    async fn sales(&self) -> Slot<SalesAnalytics> {
        let window_days = self.settings.window_days;
        let source = QuerySource::SalesAnalytics { window_days };
        let result = self
            .queries
            .fetch(self.key(source), self.settings.retry, self.settings.timeout, || {
                self.source.sales_analytics(window_days)
            })
            .await;
        Slot::settle(source, result)
    }

    async fn finance(&self) -> Slot<FinanceDashboard> {
        let window_days = self.settings.window_days;
        let source = QuerySource::FinanceDashboard { window_days };
        let result = self
            .queries
            .fetch(self.key(source), self.settings.retry, self.settings.timeout, || {
                self.source.finance_dashboard(window_days)
            })
            .await;
        Slot::settle(source, result)
    }
}
