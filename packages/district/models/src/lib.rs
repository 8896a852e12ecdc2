#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! District boundary and green-space statistic types.
//!
//! Defines the `GeoJSON` shapes stored and served for kecamatan (district)
//! boundaries, the RTH statistic rows joined onto them, and the name key
//! used to match the two.

pub mod geometry;
pub mod statistic;

use serde::{Deserialize, Serialize};

pub use geometry::{DistrictGeometry, GeometryError, Polygon, Position, Ring};
pub use statistic::{ClusterLabel, DistrictStatistic, StatisticValues};

/// Name used when a boundary feature carries no recognizable name.
pub const UNKNOWN_DISTRICT_NAME: &str = "Unknown";

/// Fill color used when a boundary feature carries no color.
pub const DEFAULT_DISTRICT_COLOR: &str = "#3388ff";

/// Display properties of a district boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictProperties {
    /// District name.
    pub name: String,
    /// Area-derived metric, in the units of the source data.
    pub area: f64,
    /// Fill color as a CSS hex string.
    pub color: String,
}

/// A district boundary as a `GeoJSON` `Feature`.
///
/// `id` is absent on freshly normalized features and assigned once the
/// feature is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct DistrictFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: DistrictProperties,
    pub geometry: DistrictGeometry,
}

impl DistrictFeature {
    /// The join key for this feature's name.
    #[must_use]
    pub fn key(&self) -> String {
        district_key(&self.properties.name)
    }
}

/// A `GeoJSON` `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection<F> {
    pub features: Vec<F>,
}

impl<F> FeatureCollection<F> {
    #[must_use]
    pub const fn new(features: Vec<F>) -> Self {
        Self { features }
    }
}

impl<F> Default for FeatureCollection<F> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Normalizes a district name into the key used to match boundaries to
/// statistics: surrounding whitespace trimmed, lowercased.
#[must_use]
pub fn district_key(name: &str) -> String {
    name.trim().to_lowercase()
}
