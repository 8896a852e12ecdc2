//! Normalization of uploaded district `FeatureCollection`s.
//!
//! Turns whatever boundary export an administrator uploads into the
//! clean [`DistrictFeature`] shape: a resolved name, an area metric, a
//! display color and 2D geometry. The batch is all-or-nothing: one
//! feature that cannot be read fails the whole upload.

use rth_map_district_models::{
    DEFAULT_DISTRICT_COLOR, DistrictFeature, DistrictGeometry, DistrictProperties,
    FeatureCollection, GeometryError, UNKNOWN_DISTRICT_NAME,
};
use serde_json::{Map, Value};

use crate::IngestError;
use crate::aliases::{PropertyField, resolve_number, resolve_str};

/// Why a single feature could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// Not a `GeoJSON` `Feature` (missing type, non-object properties,
    /// malformed coordinates).
    #[error("{0}")]
    Invalid(String),

    /// `geometry` is null or absent.
    #[error("feature has no geometry")]
    MissingGeometry,

    /// The geometry is valid `GeoJSON` but not a usable boundary.
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Parses and normalizes an uploaded `GeoJSON` document.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if `bytes` is not JSON, and otherwise
/// whatever [`normalize_feature_collection`] returns.
pub fn normalize_bytes(bytes: &[u8]) -> Result<FeatureCollection<DistrictFeature>, IngestError> {
    let raw: Value = serde_json::from_slice(bytes)?;
    normalize_feature_collection(raw)
}

/// Normalizes a raw `FeatureCollection` value.
///
/// Features are read one at a time so an error can name the offending
/// index.
///
/// # Errors
///
/// Returns [`IngestError::Format`] if `raw` is not a `FeatureCollection`
/// with a `features` array, or [`IngestError::Feature`] for the first
/// feature that cannot be normalized.
pub fn normalize_feature_collection(
    raw: Value,
) -> Result<FeatureCollection<DistrictFeature>, IngestError> {
    let Value::Object(mut object) = raw else {
        return Err(IngestError::Format {
            message: "type must be \"FeatureCollection\"".to_string(),
        });
    };

    if object.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(IngestError::Format {
            message: "type must be \"FeatureCollection\"".to_string(),
        });
    }

    let Some(Value::Array(features)) = object.remove("features") else {
        return Err(IngestError::Format {
            message: "features must be an array".to_string(),
        });
    };

    let normalized = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            normalize_feature(feature).map_err(|source| IngestError::Feature { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let unnamed = normalized
        .iter()
        .filter(|f| f.properties.name == UNKNOWN_DISTRICT_NAME)
        .count();
    if unnamed > 0 {
        log::warn!("{unnamed} of {} features have no recognizable name", normalized.len());
    }

    Ok(FeatureCollection::new(normalized))
}

/// Normalizes one raw feature.
///
/// # Errors
///
/// Returns [`FeatureError`] if the value is not a `GeoJSON` feature or
/// its geometry is missing or not a polygon.
pub fn normalize_feature(raw: Value) -> Result<DistrictFeature, FeatureError> {
    let feature =
        geojson::Feature::from_json_value(raw).map_err(|e| FeatureError::Invalid(e.to_string()))?;

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(FeatureError::MissingGeometry)?;
    let geometry = DistrictGeometry::try_from(geometry)?;

    let empty = Map::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);

    Ok(DistrictFeature {
        id: None,
        properties: DistrictProperties {
            name: resolve_str(properties, PropertyField::Name)
                .unwrap_or(UNKNOWN_DISTRICT_NAME)
                .to_string(),
            area: resolve_number(properties, PropertyField::Area).unwrap_or(0.0),
            color: resolve_str(properties, PropertyField::Color)
                .unwrap_or(DEFAULT_DISTRICT_COLOR)
                .to_string(),
        },
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(z: bool) -> Value {
        if z {
            json!([[[107.6, -6.9, 12.0], [107.7, -6.9, 12.0], [107.7, -6.8, 12.0], [107.6, -6.9, 12.0]]])
        } else {
            json!([[[107.6, -6.9], [107.7, -6.9], [107.7, -6.8], [107.6, -6.9]]])
        }
    }

    fn feature(properties: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": { "type": "Polygon", "coordinates": square(false) }
        })
    }

    fn collection(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn produces_exactly_the_clean_feature_fields() {
        let raw = collection(vec![json!({
            "type": "Feature",
            "properties": { "NAMOBJ": "Coblong", "OBJECTID": 3, "FCODE": "BA03070040", "luasRTH": 0.0003 },
            "geometry": { "type": "Polygon", "coordinates": square(true) }
        })]);
        let normalized = normalize_feature_collection(raw).unwrap();
        let json = serde_json::to_value(&normalized.features[0]).unwrap();

        assert_eq!(
            json,
            json!({
                "type": "Feature",
                "properties": { "name": "Coblong", "area": 0.0003, "color": "#3388ff" },
                "geometry": { "type": "Polygon", "coordinates": square(false) }
            })
        );
    }

    #[test]
    fn missing_name_becomes_unknown() {
        let raw = collection(vec![feature(json!({ "OBJECTID": 1 }))]);
        let normalized = normalize_feature_collection(raw).unwrap();

        assert_eq!(normalized.features[0].properties.name, "Unknown");
        assert!(normalized.features[0].properties.area.abs() < f64::EPSILON);
    }

    #[test]
    fn null_properties_are_defaulted() {
        let feature = normalize_feature(feature(Value::Null)).unwrap();

        assert_eq!(feature.properties.name, "Unknown");
        assert_eq!(feature.properties.color, "#3388ff");
    }

    #[test]
    fn keeps_existing_color() {
        let raw = feature(json!({ "name": "Andir", "warna": "#FFC107" }));
        assert_eq!(normalize_feature(raw).unwrap().properties.color, "#FFC107");
    }

    #[test]
    fn rejects_wrong_collection_type() {
        let raw = json!({ "type": "Feature", "features": [] });
        assert!(matches!(
            normalize_feature_collection(raw),
            Err(IngestError::Format { .. })
        ));
        assert!(matches!(
            normalize_feature_collection(json!([])),
            Err(IngestError::Format { .. })
        ));
    }

    #[test]
    fn rejects_missing_features_array() {
        let raw = json!({ "type": "FeatureCollection", "features": {} });
        assert!(matches!(
            normalize_feature_collection(raw),
            Err(IngestError::Format { .. })
        ));
    }

    #[test]
    fn one_bad_feature_fails_the_batch() {
        let good = feature(json!({ "name": "Andir" }));
        let bad = json!({
            "type": "Feature",
            "properties": { "name": "Broken" },
            "geometry": { "type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]] }
        });
        let err = normalize_feature_collection(collection(vec![good.clone(), bad, good]))
            .unwrap_err();

        assert!(
            matches!(
                err,
                IngestError::Feature {
                    index: 1,
                    source: FeatureError::Geometry(GeometryError::UnsupportedType(_)),
                }
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_features_that_are_not_geojson() {
        let untyped = json!({
            "properties": { "name": "Andir" },
            "geometry": { "type": "Polygon", "coordinates": square(false) }
        });
        assert!(matches!(normalize_feature(untyped), Err(FeatureError::Invalid(_))));

        let listed_properties = json!({
            "type": "Feature",
            "properties": ["Andir"],
            "geometry": { "type": "Polygon", "coordinates": square(false) }
        });
        assert!(matches!(
            normalize_feature(listed_properties),
            Err(FeatureError::Invalid(_))
        ));

        let string_coordinates = json!({
            "type": "Feature",
            "properties": null,
            "geometry": { "type": "Polygon", "coordinates": [[["107.6", -6.9]]] }
        });
        assert!(matches!(
            normalize_feature(string_coordinates),
            Err(FeatureError::Invalid(_))
        ));
    }

    #[test]
    fn null_geometry_is_rejected() {
        let raw = json!({ "type": "Feature", "properties": { "name": "Andir" }, "geometry": null });
        assert_eq!(normalize_feature(raw), Err(FeatureError::MissingGeometry));
    }

    #[test]
    fn normalize_bytes_reports_invalid_json() {
        assert!(matches!(normalize_bytes(b"{not json"), Err(IngestError::Json(_))));
    }

    #[test]
    fn empty_collection_is_valid() {
        let normalized = normalize_bytes(br#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert!(normalized.features.is_empty());
    }
}
