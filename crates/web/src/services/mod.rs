//! Business logic services for the shell.
//!
//! # Services
//!
//! - `query` - Keyed result cache with retry and per-attempt timeouts
//! - `dashboard` - Concurrent aggregation of the four dashboard sources

pub mod dashboard;
pub mod query;

pub use dashboard::{
    AggregatorSettings, DashboardAggregator, DashboardSnapshot, DashboardSource, Slot, SlotState,
};
pub use query::{QueryCache, QueryKey, QuerySource, RetryPolicy};
