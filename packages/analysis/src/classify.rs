//! Color and level classification for the district map.
//!
//! Two schemes exist side by side: the statistic-driven one colors a
//! district by its cluster label, and the boundary-driven one buckets the
//! area metric carried on the uploaded feature.

use rth_map_district_models::ClusterLabel;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Fill color for districts without a recognized cluster.
pub const NO_DATA_COLOR: &str = "#CCCCCC";

/// Area above which a district is classified [`RthLevel::High`].
pub const HIGH_AREA_THRESHOLD: f64 = 0.0002;

/// Area above which a district is classified [`RthLevel::Medium`].
pub const MEDIUM_AREA_THRESHOLD: f64 = 0.0001;

/// Fill color for a cluster label.
#[must_use]
pub const fn cluster_color(label: ClusterLabel) -> &'static str {
    match label {
        ClusterLabel::Cluster0 => "#E53E3E",
        ClusterLabel::Cluster1 => "#F6E05E",
        ClusterLabel::Cluster2 => "#38A169",
    }
}

/// Fill color for a district's cluster, or [`NO_DATA_COLOR`] when it has
/// no recognized label.
#[must_use]
pub fn cluster_color_for(label: Option<ClusterLabel>) -> &'static str {
    label.map_or(NO_DATA_COLOR, cluster_color)
}

/// Legend name for a district's cluster.
#[must_use]
pub fn cluster_name_for(label: Option<ClusterLabel>) -> &'static str {
    label.map_or("Tidak diketahui", ClusterLabel::display_name)
}

/// Green-space level derived from a district's area metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RthLevel {
    High,
    Medium,
    Low,
}

impl RthLevel {
    /// Buckets an area using the fixed thresholds. Values are compared in
    /// the units they were stored in.
    #[must_use]
    pub fn from_area(area: f64) -> Self {
        if area > HIGH_AREA_THRESHOLD {
            Self::High
        } else if area > MEDIUM_AREA_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Fill color for this level.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#4CAF50",
            Self::Medium => "#FFC107",
            Self::Low => "#F44336",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_thresholds() {
        assert_eq!(RthLevel::from_area(0.000_25), RthLevel::High);
        assert_eq!(RthLevel::from_area(0.000_15), RthLevel::Medium);
        assert_eq!(RthLevel::from_area(0.000_05), RthLevel::Low);
        assert_eq!(RthLevel::from_area(0.000_25).color(), "#4CAF50");
        assert_eq!(RthLevel::from_area(0.000_15).color(), "#FFC107");
        assert_eq!(RthLevel::from_area(0.000_05).color(), "#F44336");
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(RthLevel::from_area(HIGH_AREA_THRESHOLD), RthLevel::Medium);
        assert_eq!(RthLevel::from_area(MEDIUM_AREA_THRESHOLD), RthLevel::Low);
        assert_eq!(RthLevel::from_area(0.0), RthLevel::Low);
    }

    #[test]
    fn cluster_colors() {
        assert_eq!(cluster_color_for(Some(ClusterLabel::Cluster0)), "#E53E3E");
        assert_eq!(cluster_color_for(Some(ClusterLabel::Cluster1)), "#F6E05E");
        assert_eq!(cluster_color_for(Some(ClusterLabel::Cluster2)), "#38A169");
        assert_eq!(cluster_color_for(ClusterLabel::parse("cluster_7")), NO_DATA_COLOR);
        assert_eq!(cluster_color_for(None), NO_DATA_COLOR);
    }

    #[test]
    fn cluster_names() {
        assert_eq!(
            cluster_name_for(ClusterLabel::parse("cluster_1")),
            "Cluster 1 (RTH Menengah)"
        );
        assert_eq!(cluster_name_for(ClusterLabel::parse("")), "Tidak diketahui");
    }
}
