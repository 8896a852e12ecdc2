#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB` storage for the RTH map.
//!
//! One database file holds district boundaries, RTH statistics,
//! administrator accounts, and revoked tokens. Repositories are plain
//! functions over a [`duckdb::Connection`] borrowed from the [`DbPool`];
//! operations that must be atomic take `&mut Connection` and open their
//! own transaction.

pub mod admins;
pub mod blacklist;
pub mod districts;
pub mod paths;
pub mod pool;
pub mod schema;
pub mod statistics;

pub use pool::DbPool;

use chrono::{DateTime, Utc};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query error.
    #[error("Database error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored geometry could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A connection mutex was poisoned by a panicking holder.
    #[error("Database connection pool is poisoned")]
    PoolPoisoned,

    /// A write would create a second row for a unique key.
    #[error("{entity} '{key}' already exists")]
    Duplicate {
        /// What kind of record collided.
        entity: &'static str,
        /// The colliding key.
        key: String,
    },
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("invalid timestamp '{value}': {e}"),
        })
}
