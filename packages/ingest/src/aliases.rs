//! Property-name aliases for uploaded district boundaries.
//!
//! Boundary files come from several government exports that disagree on
//! key names, and some of them misspell the "nama objek" key as
//! `NAMEOBJ`. Each logical field has an ordered alias list; the first
//! alias carrying a usable value wins.

use serde_json::{Map, Value};

/// A logical property read from an uploaded feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Name,
    Area,
    Color,
}

impl PropertyField {
    /// Accepted property keys for this field, in priority order.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name", "NAMOBJ", "NAMEOBJ", "WADMKC", "KECAMATAN", "kecamatan"],
            Self::Area => &["area", "luasRTH", "luas_rth", "LUAS", "Shape_Area", "SHAPE_Area"],
            Self::Color => &["color", "warna", "fillColor"],
        }
    }
}

/// Resolves `field` against `properties`, returning the first alias value
/// that `extract` accepts.
///
/// Aliases whose value is present but rejected by `extract` (wrong type,
/// blank string) are skipped rather than treated as a match.
pub fn resolve<'a, T>(
    properties: &'a Map<String, Value>,
    field: PropertyField,
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    field
        .aliases()
        .iter()
        .filter_map(|alias| properties.get(*alias))
        .find_map(extract)
}

/// Resolves a non-blank string field, trimmed.
#[must_use]
pub fn resolve_str(properties: &Map<String, Value>, field: PropertyField) -> Option<&str> {
    resolve(properties, field, |value| {
        value.as_str().map(str::trim).filter(|s| !s.is_empty())
    })
}

/// Resolves a finite numeric field. Numeric strings are accepted.
#[must_use]
pub fn resolve_number(properties: &Map<String, Value>, field: PropertyField) -> Option<f64> {
    resolve(properties, field, |value| {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn single(key: &str, value: Value) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert(key.to_string(), value);
        properties
    }

    #[test]
    fn every_name_alias_is_recognized() {
        for alias in PropertyField::Name.aliases() {
            let properties = single(alias, json!("Coblong"));
            assert_eq!(
                resolve_str(&properties, PropertyField::Name),
                Some("Coblong"),
                "alias {alias} not resolved"
            );
        }
    }

    #[test]
    fn every_area_alias_is_recognized() {
        for alias in PropertyField::Area.aliases() {
            let properties = single(alias, json!(0.00025));
            assert_eq!(
                resolve_number(&properties, PropertyField::Area),
                Some(0.00025),
                "alias {alias} not resolved"
            );
        }
    }

    #[test]
    fn every_color_alias_is_recognized() {
        for alias in PropertyField::Color.aliases() {
            let properties = single(alias, json!("#4CAF50"));
            assert_eq!(
                resolve_str(&properties, PropertyField::Color),
                Some("#4CAF50"),
                "alias {alias} not resolved"
            );
        }
    }

    #[test]
    fn earlier_alias_wins() {
        let properties = props(json!({ "WADMKC": "Later", "NAMOBJ": "Earlier" }));
        assert_eq!(resolve_str(&properties, PropertyField::Name), Some("Earlier"));
    }

    #[test]
    fn misspelled_key_is_recovered() {
        let properties = props(json!({ "NAMEOBJ": "Sukasari", "FCODE": "BA03070040" }));
        assert_eq!(resolve_str(&properties, PropertyField::Name), Some("Sukasari"));
    }

    #[test]
    fn blank_and_mistyped_values_fall_through() {
        let properties = props(json!({ "name": "  ", "NAMOBJ": 42, "WADMKC": " Cidadap " }));
        assert_eq!(resolve_str(&properties, PropertyField::Name), Some("Cidadap"));
    }

    #[test]
    fn numeric_strings_are_accepted_for_area() {
        let properties = props(json!({ "luasRTH": " 12.5 " }));
        assert_eq!(resolve_number(&properties, PropertyField::Area), Some(12.5));
    }

    #[test]
    fn missing_field_resolves_to_none() {
        let properties = props(json!({ "OBJECTID": 7 }));
        assert_eq!(resolve_str(&properties, PropertyField::Name), None);
        assert_eq!(resolve_number(&properties, PropertyField::Area), None);
    }
}
