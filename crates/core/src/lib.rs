//! ERP Shell Core - Shared types library.
//!
//! This crate provides common types used across the ERP shell components:
//! - `web` - The navigation frame and dashboard server
//! - `integration-tests` - Black-box tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Roles, money formatting, and the backend's analytics payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
