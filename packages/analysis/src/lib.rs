#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map analysis for the RTH map.
//!
//! Merges district boundaries with their green-space statistics into the
//! `FeatureCollection` rendered by the map, and classifies districts by
//! cluster label or by area metric.

pub mod classify;
pub mod merge;

use rth_map_district_models::DistrictFeature;
use serde::Serialize;

pub use classify::{RthLevel, cluster_color_for};
pub use merge::{MapFeature, MergedDistrict, map_data, merge};

/// Per-level counts from an area re-analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AnalysisSummary {
    const fn record(&mut self, level: RthLevel) {
        match level {
            RthLevel::High => self.high += 1,
            RthLevel::Medium => self.medium += 1,
            RthLevel::Low => self.low += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Recolors every district from its area metric.
pub fn analyze_districts(districts: &mut [DistrictFeature]) -> AnalysisSummary {
    let mut summary = AnalysisSummary::default();

    for district in districts.iter_mut() {
        let level = RthLevel::from_area(district.properties.area);
        district.properties.color = level.color().to_string();
        summary.record(level);
    }

    log::info!(
        "Analyzed {} districts: {} high, {} medium, {} low",
        summary.total(),
        summary.high,
        summary.medium,
        summary.low
    );

    summary
}
