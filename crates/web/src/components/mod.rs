//! View-model components rendered by the templates.
//!
//! - `nav` - Role-gated navigation catalog and the persistent frame
//! - `dashboard` - KPI tiles and panels derived from a dashboard snapshot

pub mod dashboard;
pub mod nav;

pub use dashboard::{DashboardView, FinancePanel, KpiTile, TopSellersPanel};
pub use nav::{CATALOG, NavEntry, NavFrame, NavLink, visible_items};
