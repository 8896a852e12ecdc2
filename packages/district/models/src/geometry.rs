//! Typed 2D `GeoJSON` polygon geometry.
//!
//! Positions are always `[longitude, latitude]`. There is no third
//! dimension anywhere in these types, so anything that reaches storage
//! through them is 2D by construction. Reading and writing goes through
//! [`geojson::Geometry`]; converting from it drops altitude and any
//! further position members.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single `[longitude, latitude]` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Position {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A closed linear ring of positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(pub Vec<Position>);

/// A polygon: an exterior ring followed by zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(pub Vec<Ring>);

/// Geometry of a district boundary.
///
/// Only the two areal `GeoJSON` geometry types are supported. Serializes
/// to the standard `{"type": ..., "coordinates": ...}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "geojson::Geometry", into = "geojson::Geometry")]
pub enum DistrictGeometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

/// Why a `GeoJSON` geometry cannot be used as a district boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Geometry type is not one of the supported areal types.
    #[error("unsupported geometry type {0:?} (expected Polygon or MultiPolygon)")]
    UnsupportedType(String),

    /// A position lacks a finite longitude or latitude.
    #[error("expected a position with finite longitude and latitude at {path}")]
    Position {
        /// Path of the offending position, e.g. `coordinates[0][2]`.
        path: String,
    },
}

impl TryFrom<&geojson::Geometry> for DistrictGeometry {
    type Error = GeometryError;

    fn try_from(geometry: &geojson::Geometry) -> Result<Self, Self::Error> {
        match &geometry.value {
            geojson::Value::Polygon(rings) => polygon_from(rings, "coordinates").map(Self::Polygon),
            geojson::Value::MultiPolygon(polygons) => polygons
                .iter()
                .enumerate()
                .map(|(i, rings)| polygon_from(rings, &format!("coordinates[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::MultiPolygon),
            other => Err(GeometryError::UnsupportedType(other.type_name().to_string())),
        }
    }
}

impl TryFrom<geojson::Geometry> for DistrictGeometry {
    type Error = GeometryError;

    fn try_from(geometry: geojson::Geometry) -> Result<Self, Self::Error> {
        Self::try_from(&geometry)
    }
}

impl From<DistrictGeometry> for geojson::Geometry {
    fn from(geometry: DistrictGeometry) -> Self {
        let value = match geometry {
            DistrictGeometry::Polygon(polygon) => geojson::Value::Polygon(polygon_into(polygon)),
            DistrictGeometry::MultiPolygon(polygons) => {
                geojson::Value::MultiPolygon(polygons.into_iter().map(polygon_into).collect())
            }
        };
        Self::new(value)
    }
}

fn polygon_from(rings: &geojson::PolygonType, path: &str) -> Result<Polygon, GeometryError> {
    rings
        .iter()
        .enumerate()
        .map(|(r, ring)| {
            ring.iter()
                .enumerate()
                .map(|(p, position)| position_from(position, || format!("{path}[{r}][{p}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Ring)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Polygon)
}

fn position_from(
    position: &[f64],
    path: impl FnOnce() -> String,
) -> Result<Position, GeometryError> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(Position::new(*lon, *lat)),
        _ => Err(GeometryError::Position { path: path() }),
    }
}

fn polygon_into(polygon: Polygon) -> geojson::PolygonType {
    polygon
        .0
        .into_iter()
        .map(|ring| ring.0.into_iter().map(|p| vec![p.lon, p.lat]).collect())
        .collect()
}
