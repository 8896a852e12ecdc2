//! RTH (green open space) statistics per district.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Categorical green-space adequacy bucket assigned to a district.
///
/// Serialized as the lowercase `cluster_<n>` labels produced by the
/// clustering spreadsheet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ClusterLabel {
    /// Lowest green-space share.
    #[serde(rename = "cluster_0")]
    #[strum(serialize = "cluster_0")]
    Cluster0,
    /// Middle green-space share.
    #[serde(rename = "cluster_1")]
    #[strum(serialize = "cluster_1")]
    Cluster1,
    /// Highest green-space share.
    #[serde(rename = "cluster_2")]
    #[strum(serialize = "cluster_2")]
    Cluster2,
}

impl ClusterLabel {
    /// All cluster labels, in bucket order.
    pub const ALL: &[Self] = &[Self::Cluster0, Self::Cluster1, Self::Cluster2];

    /// Bucket assigned when a record does not name one.
    pub const DEFAULT: Self = Self::Cluster0;

    /// Parses a stored cluster string, ignoring surrounding whitespace.
    ///
    /// Returns `None` for anything outside the fixed enumeration.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Human-readable label shown in the map legend.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cluster0 => "Cluster 0 (RTH Rendah)",
            Self::Cluster1 => "Cluster 1 (RTH Menengah)",
            Self::Cluster2 => "Cluster 2 (RTH Tinggi)",
        }
    }
}

/// A stored green-space statistic row for one district.
///
/// Field names on the wire follow the dashboard's Indonesian column
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictStatistic {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub values: StatisticValues,
    /// When the row was last written.
    #[serde(rename = "tanggal_update")]
    pub updated_at: DateTime<Utc>,
}

impl DistrictStatistic {
    /// Share of the district covered by green space, in percent.
    ///
    /// Returns `0.0` when the district area is unknown.
    #[must_use]
    pub fn green_percentage(&self) -> f64 {
        if self.values.district_area > 0.0 {
            self.values.total_green_area / self.values.district_area * 100.0
        } else {
            0.0
        }
    }
}

/// The user-editable part of a [`DistrictStatistic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticValues {
    /// District name; matched case-insensitively against boundary names.
    #[serde(rename = "kecamatan")]
    pub district: String,
    /// Park area in hectares.
    #[serde(rename = "luas_taman", default)]
    pub park_area: f64,
    /// Cemetery area in hectares.
    #[serde(rename = "luas_pemakaman", default)]
    pub cemetery_area: f64,
    /// Total green open space in hectares.
    #[serde(rename = "total_rth", default)]
    pub total_green_area: f64,
    /// Total district area in hectares.
    #[serde(rename = "luas_kecamatan", default)]
    pub district_area: f64,
    /// Cluster label. Usually one of [`ClusterLabel`], but stored verbatim.
    #[serde(default = "default_cluster")]
    pub cluster: String,
}

impl StatisticValues {
    /// Creates values for `district` with every measurement zeroed.
    #[must_use]
    pub fn new(district: impl Into<String>) -> Self {
        Self {
            district: district.into(),
            park_area: 0.0,
            cemetery_area: 0.0,
            total_green_area: 0.0,
            district_area: 0.0,
            cluster: default_cluster(),
        }
    }

    /// The typed cluster label, if the stored value is recognized.
    #[must_use]
    pub fn cluster_label(&self) -> Option<ClusterLabel> {
        ClusterLabel::parse(&self.cluster)
    }
}

fn default_cluster() -> String {
    ClusterLabel::DEFAULT.to_string()
}
