//! Joins district boundaries with their RTH statistics.
//!
//! Boundaries and statistics are maintained independently and only share
//! the district name. The join key is [`district_key`], and every
//! boundary appears exactly once in the output whether or not a
//! statistic matched it.

use std::collections::HashMap;

use rth_map_district_models::{
    DistrictFeature, DistrictGeometry, DistrictStatistic, FeatureCollection, StatisticValues,
    district_key,
};
use serde::Serialize;

use crate::classify::{cluster_color_for, cluster_name_for};

/// A boundary paired with its matched statistic, if any.
#[derive(Debug, Clone, Copy)]
pub struct MergedDistrict<'a> {
    pub district: &'a DistrictFeature,
    pub statistic: Option<&'a DistrictStatistic>,
}

impl MergedDistrict<'_> {
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.statistic.is_some()
    }
}

/// Indexes statistics by district key.
///
/// Duplicate keys are rejected when statistics are written, so they
/// should not occur here. If they do, the later record wins and a
/// warning is logged.
#[must_use]
pub fn index_statistics(statistics: &[DistrictStatistic]) -> HashMap<String, &DistrictStatistic> {
    let mut index = HashMap::with_capacity(statistics.len());

    for statistic in statistics {
        let key = district_key(&statistic.values.district);
        if let Some(previous) = index.insert(key, statistic) {
            log::warn!(
                "Duplicate RTH statistic for district {:?} (records {} and {}); using {}",
                statistic.values.district,
                previous.id,
                statistic.id,
                statistic.id
            );
        }
    }

    index
}

/// Pairs every district with its statistic.
#[must_use]
pub fn merge<'a>(
    districts: &'a [DistrictFeature],
    statistics: &'a [DistrictStatistic],
) -> Vec<MergedDistrict<'a>> {
    let index = index_statistics(statistics);

    let merged: Vec<MergedDistrict<'a>> = districts
        .iter()
        .map(|district| MergedDistrict {
            district,
            statistic: index.get(&district.key()).copied(),
        })
        .collect();

    log::debug!(
        "Merged {} districts with {} statistics ({} matched)",
        districts.len(),
        statistics.len(),
        merged.iter().filter(|m| m.has_data()).count()
    );

    merged
}

/// Display properties of a merged map feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFeatureProperties {
    pub name: String,
    pub area: f64,
    pub color: String,
    pub has_data: bool,
    pub cluster: Option<String>,
    pub cluster_name: &'static str,
    pub fill_color: &'static str,
    #[serde(rename = "luas_taman")]
    pub park_area: f64,
    #[serde(rename = "luas_pemakaman")]
    pub cemetery_area: f64,
    #[serde(rename = "total_rth")]
    pub total_green_area: f64,
    #[serde(rename = "luas_kecamatan")]
    pub district_area: f64,
    pub rth_percentage: f64,
    pub rth_data: Option<DistrictStatistic>,
}

/// A renderable `GeoJSON` feature with flattened display properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct MapFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: MapFeatureProperties,
    pub geometry: DistrictGeometry,
}

impl From<MergedDistrict<'_>> for MapFeature {
    fn from(merged: MergedDistrict<'_>) -> Self {
        let district = merged.district;
        let statistic = merged.statistic;
        let values = statistic.map(|s| &s.values);
        let label = values.and_then(StatisticValues::cluster_label);

        Self {
            id: district.id.clone(),
            properties: MapFeatureProperties {
                name: district.properties.name.clone(),
                area: district.properties.area,
                color: district.properties.color.clone(),
                has_data: statistic.is_some(),
                cluster: values.map(|v| v.cluster.clone()),
                cluster_name: cluster_name_for(label),
                fill_color: cluster_color_for(label),
                park_area: values.map_or(0.0, |v| v.park_area),
                cemetery_area: values.map_or(0.0, |v| v.cemetery_area),
                total_green_area: values.map_or(0.0, |v| v.total_green_area),
                district_area: values.map_or(0.0, |v| v.district_area),
                rth_percentage: statistic.map_or(0.0, DistrictStatistic::green_percentage),
                rth_data: statistic.cloned(),
            },
            geometry: district.geometry.clone(),
        }
    }
}

/// Builds the merged map `FeatureCollection`.
#[must_use]
pub fn map_data(
    districts: &[DistrictFeature],
    statistics: &[DistrictStatistic],
) -> FeatureCollection<MapFeature> {
    FeatureCollection::new(
        merge(districts, statistics)
            .into_iter()
            .map(MapFeature::from)
            .collect(),
    )
}
