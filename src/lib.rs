//! PostgreSQL backend adapter.
//!
//! Sits between an ORM's generic driver interface and a native PostgreSQL
//! client: maps settings to connect parameters, wraps cursors to translate
//! errors, coerces temporal columns, and manages the connection lifecycle.

// Core infrastructure modules
pub mod core;

pub mod config;
pub mod test_utils;

pub use crate::core::db::{DatabaseFeatures, DatabaseWrapper, PgDriver};
pub use crate::core::{AdapterError, Result};
