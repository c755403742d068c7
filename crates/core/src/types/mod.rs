//! Core types for the ERP shell.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod analytics;
pub mod identity;
pub mod money;
pub mod role;

pub use analytics::*;
pub use identity::{AccessTokenResponse, BackendUser, LoginRequest};
pub use money::{Money, NumberLocale, UnknownLocale};
pub use role::{Role, RoleSet};
