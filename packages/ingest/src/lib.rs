#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion of district boundaries and RTH statistics.
//!
//! Boundary uploads are normalized from arbitrary `GeoJSON` exports into
//! clean 2D district features ([`normalize`]), and spreadsheet rows are
//! mapped onto statistic records by header keyword ([`statistics`]).
//! Both paths are pure; persisting the result is the caller's job.

pub mod aliases;
pub mod normalize;
pub mod statistics;

use thiserror::Error;

pub use normalize::{FeatureError, normalize_bytes, normalize_feature_collection};
pub use statistics::import_rows;

/// Errors that can occur while ingesting uploaded data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is JSON but not a `FeatureCollection`.
    #[error("Invalid GeoJSON format: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },

    /// A feature could not be normalized, failing the whole batch.
    #[error("Invalid feature at index {index}: {source}")]
    Feature {
        /// Zero-based index of the feature in `features`.
        index: usize,
        /// What was wrong with it.
        source: FeatureError,
    },

    /// A spreadsheet row could not be imported.
    #[error("Invalid row {row}: {message}")]
    Row {
        /// One-based row number.
        row: usize,
        /// Description of what went wrong.
        message: String,
    },
}
