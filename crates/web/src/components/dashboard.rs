//! Display-ready dashboard view.
//!
//! Turns a [`DashboardSnapshot`] into the four KPI tiles and the two panels.
//! Every missing value falls back independently: KPI fields to zero, finance
//! line items to zero, and the panels to their placeholders when their
//! source produced nothing usable.

use erp_shell_core::{
    DashboardSummary, FinanceDashboard, Money, NumberLocale, SalesAnalytics, SummaryKpis,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::services::{DashboardSnapshot, SlotState};

/// Number of products charted in the top-sellers panel.
pub const TOP_SELLERS_LIMIT: usize = 5;

/// The four headline indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    Revenue,
    Orders,
    Employees,
    LowStock,
}

impl KpiKind {
    /// Tiles in display order.
    pub const ALL: [Self; 4] = [Self::Revenue, Self::Orders, Self::Employees, Self::LowStock];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue (30d)",
            Self::Orders => "Orders (30d)",
            Self::Employees => "Employees",
            Self::LowStock => "Low Stock Items",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Revenue => "dollar-sign",
            Self::Orders => "shopping-cart",
            Self::Employees => "users",
            Self::LowStock => "package",
        }
    }

    #[must_use]
    pub const fn accent(self) -> &'static str {
        match self {
            Self::Revenue => "green",
            Self::Orders => "blue",
            Self::Employees => "purple",
            Self::LowStock => "red",
        }
    }

    fn value(self, kpis: Option<&SummaryKpis>, locale: NumberLocale) -> String {
        match self {
            Self::Revenue => kpis
                .and_then(|k| k.total_revenue_30d)
                .unwrap_or(Money::ZERO)
                .format(locale),
            Self::Orders => count(kpis.and_then(|k| k.order_count_30d)),
            Self::Employees => count(kpis.and_then(|k| k.active_employees)),
            Self::LowStock => count(kpis.and_then(|k| k.low_stock_items)),
        }
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_string()
}

/// One KPI tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiTile {
    pub kind: KpiKind,
    pub title: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub accent: &'static str,
}

/// One bar of the top-sellers chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarView {
    pub name: String,
    pub revenue: Money,
    /// Revenue formatted like every other currency value
    pub revenue_label: String,
    /// Bar length relative to the largest bar, 0 to 100
    pub percent: u32,
}

/// The top-sellers panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TopSellersPanel {
    /// Up to [`TOP_SELLERS_LIMIT`] bars in source order.
    Chart { bars: Vec<BarView> },
    /// No products to chart yet.
    NoData,
}

impl TopSellersPanel {
    fn from_sales(sales: Option<&SalesAnalytics>, locale: NumberLocale) -> Self {
        let products = sales
            .and_then(|s| s.best_selling_products.as_deref())
            .unwrap_or_default();
        if products.is_empty() {
            return Self::NoData;
        }

        let top = products.iter().take(TOP_SELLERS_LIMIT);
        let max = top
            .clone()
            .map(|p| p.revenue().amount())
            .max()
            .unwrap_or(Decimal::ZERO);

        let bars = top
            .map(|product| {
                let revenue = product.revenue();
                BarView {
                    name: product.label().to_string(),
                    revenue,
                    revenue_label: revenue.format(locale),
                    percent: bar_percent(revenue.amount(), max),
                }
            })
            .collect();

        Self::Chart { bars }
    }
}

fn bar_percent(value: Decimal, max: Decimal) -> u32 {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    (value / max * Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0)
        .min(100)
}

/// The financial summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FinancePanel {
    /// Three line items, each defaulting to zero on its own.
    Summary {
        total_revenue: String,
        total_expenses: String,
        net_profit: String,
    },
    /// The finance fetch produced nothing.
    NoData,
}

impl FinancePanel {
    fn from_finance(finance: Option<&FinanceDashboard>, locale: NumberLocale) -> Self {
        let Some(finance) = finance else {
            return Self::NoData;
        };
        let line = |value: Option<Money>| value.unwrap_or(Money::ZERO).format(locale);

        Self::Summary {
            total_revenue: line(finance.total_revenue),
            total_expenses: line(finance.total_expenses),
            net_profit: line(finance.net_profit),
        }
    }
}

/// Per-source state, for JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStates {
    pub summary: SlotState,
    pub inventory: SlotState,
    pub sales: SlotState,
    pub finance: SlotState,
}

/// Everything the dashboard page displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub kpis: Vec<KpiTile>,
    pub top_sellers: TopSellersPanel,
    pub finance: FinancePanel,
    pub sources: SourceStates,
    pub complete: bool,
}

impl DashboardView {
    /// Derive the view from whatever has arrived so far.
    #[must_use]
    pub fn from_snapshot(snapshot: &DashboardSnapshot, locale: NumberLocale) -> Self {
        let kpis = snapshot
            .summary
            .loaded()
            .and_then(|summary: &DashboardSummary| summary.kpis.as_ref());

        Self {
            kpis: KpiKind::ALL
                .into_iter()
                .map(|kind| KpiTile {
                    kind,
                    title: kind.title(),
                    value: kind.value(kpis, locale),
                    icon: kind.icon(),
                    accent: kind.accent(),
                })
                .collect(),
            top_sellers: TopSellersPanel::from_sales(snapshot.sales.loaded(), locale),
            finance: FinancePanel::from_finance(snapshot.finance.loaded(), locale),
            sources: SourceStates {
                summary: snapshot.summary.state(),
                inventory: snapshot.inventory.state(),
                sales: snapshot.sales.state(),
                finance: snapshot.finance.state(),
            },
            complete: snapshot.is_settled(),
        }
    }

    /// Bars of the top-sellers chart; empty for the placeholder.
    #[must_use]
    pub fn bars(&self) -> &[BarView] {
        match &self.top_sellers {
            TopSellersPanel::Chart { bars } => bars,
            TopSellersPanel::NoData => &[],
        }
    }

    /// Whether the top-sellers panel shows a chart.
    #[must_use]
    pub const fn has_chart(&self) -> bool {
        matches!(self.top_sellers, TopSellersPanel::Chart { .. })
    }

    /// Finance line items as (label, value, tone) rows; empty for the placeholder.
    #[must_use]
    pub fn finance_rows(&self) -> Vec<(&'static str, &str, &'static str)> {
        match &self.finance {
            FinancePanel::Summary {
                total_revenue,
                total_expenses,
                net_profit,
            } => vec![
                ("Total Revenue", total_revenue.as_str(), "positive"),
                ("Total Expenses", total_expenses.as_str(), "negative"),
                ("Net Profit", net_profit.as_str(), "total"),
            ],
            FinancePanel::NoData => Vec::new(),
        }
    }

    /// Whether the finance panel shows its line items.
    #[must_use]
    pub const fn has_finance(&self) -> bool {
        matches!(self.finance, FinancePanel::Summary { .. })
    }

    /// Whether the sales fetch is still running.
    #[must_use]
    pub fn sales_pending(&self) -> bool {
        self.sources.sales == SlotState::Pending
    }

    /// Whether the finance fetch is still running.
    #[must_use]
    pub fn finance_pending(&self) -> bool {
        self.sources.finance == SlotState::Pending
    }
}
