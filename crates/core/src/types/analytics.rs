//! Summary payloads returned by the backend's analytics endpoints.
//!
//! Every field is optional on the wire: a subsystem may omit any metric and
//! the shell substitutes its documented fallback at display time.

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Default trailing window, in days, for sales and finance aggregates.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Response of the summary endpoint (`GET /api/auth/dashboard`).
///
/// Only privileged roles are allowed to read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub kpis: Option<SummaryKpis>,
}

/// Headline KPIs over the trailing 30 days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryKpis {
    #[serde(default)]
    pub total_revenue_30d: Option<Money>,
    #[serde(default)]
    pub order_count_30d: Option<u64>,
    #[serde(default)]
    pub active_employees: Option<u64>,
    #[serde(default)]
    pub low_stock_items: Option<u64>,
}

/// Response of `GET /api/inventory/analytics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAnalytics {
    #[serde(default)]
    pub total_products: Option<u64>,
    #[serde(default)]
    pub total_stock_value: Option<Money>,
    #[serde(default)]
    pub low_stock_count: Option<u64>,
    #[serde(default)]
    pub out_of_stock_count: Option<u64>,
}

/// Response of `GET /api/sales/analytics?days=N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAnalytics {
    #[serde(default)]
    pub total_revenue: Option<Money>,
    #[serde(default)]
    pub total_orders: Option<u64>,
    /// Products ranked by revenue, highest first.
    #[serde(default)]
    pub best_selling_products: Option<Vec<ProductRevenue>>,
}

/// Label charted for a product the backend sent without a name.
pub const UNNAMED_PRODUCT: &str = "Unnamed product";

/// One ranked entry of the best-selling products list.
///
/// Every field may be missing or null; one incomplete entry never spoils
/// the rest of the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRevenue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_revenue: Option<Money>,
    #[serde(default)]
    pub total_quantity: Option<u64>,
}

impl ProductRevenue {
    /// Name to chart, or [`UNNAMED_PRODUCT`].
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_PRODUCT)
    }

    /// Revenue, zero when missing.
    #[must_use]
    pub fn revenue(&self) -> Money {
        self.total_revenue.unwrap_or(Money::ZERO)
    }
}

/// Response of `GET /api/finance/dashboard?days=N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceDashboard {
    #[serde(default)]
    pub total_revenue: Option<Money>,
    #[serde(default)]
    pub total_expenses: Option<Money>,
    #[serde(default)]
    pub net_profit: Option<Money>,
    /// ISO date the aggregate window starts on.
    #[serde(default)]
    pub period_start: Option<String>,
    /// ISO date the aggregate window ends on.
    #[serde(default)]
    pub period_end: Option<String>,
}
