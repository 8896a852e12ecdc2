//! Import of RTH statistic rows from spreadsheet exports.
//!
//! The dashboard reads the spreadsheet client-side and posts one JSON
//! object per row, keyed by the sheet's header text. Headers vary
//! between sheets ("LUAS TAMAN (Ha)", "luas_taman", ...), so columns are
//! detected by keyword rather than by exact name.

use std::collections::HashSet;

use rth_map_district_models::{ClusterLabel, StatisticValues, district_key};
use serde_json::{Map, Value};

use crate::IngestError;

/// A statistic column recognized from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticColumn {
    District,
    ParkArea,
    CemeteryArea,
    TotalGreenArea,
    DistrictArea,
    Cluster,
}

impl StatisticColumn {
    /// Detects the column a header refers to.
    ///
    /// Matching is case-insensitive substring matching, checked in a fixed
    /// order so that e.g. "LUAS KECAMATAN" is an area and not the name.
    #[must_use]
    pub fn detect(header: &str) -> Option<Self> {
        let header = header.to_uppercase();
        let has = |keyword: &str| header.contains(keyword);

        if has("KECAMATAN") && !has("LUAS") {
            Some(Self::District)
        } else if has("LUAS") && has("TAMAN") {
            Some(Self::ParkArea)
        } else if has("LUAS") && has("PEMAKAMAN") {
            Some(Self::CemeteryArea)
        } else if has("TOTAL") && has("RTH") {
            Some(Self::TotalGreenArea)
        } else if has("LUAS") && has("KECAMATAN") {
            Some(Self::DistrictArea)
        } else if has("CLUSTER") {
            Some(Self::Cluster)
        } else {
            None
        }
    }
}

/// Coerces a loosely typed cell into a non-negative number.
///
/// Accepts JSON numbers and numeric strings using either `.` or `,` as the
/// decimal separator. Strings are read up to the end of their leading
/// number, so unit suffixes such as `"12,5 Ha"` are ignored. Anything
/// unparseable, non-finite, or negative becomes `0.0`.
#[must_use]
pub fn parse_measurement(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s.trim().replacen(',', ".", 1)),
        _ => None,
    };

    parsed.filter(|n| n.is_finite() && *n > 0.0).unwrap_or(0.0)
}

/// Parses the longest prefix of `text` that is a decimal number
/// (`[+-]digits[.digits][e[+-]digits]`).
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits_from = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let integer = digits_from(end);
    end += integer;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
    }

    if integer + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_start = end + 1;
        if matches!(bytes.get(exponent_start), Some(b'+' | b'-')) {
            exponent_start += 1;
        }
        let exponent = digits_from(exponent_start);
        if exponent > 0 {
            end = exponent_start + exponent;
        }
    }

    text[..end].parse().ok()
}

/// Reads a cluster cell.
///
/// Bare bucket numbers (`1`, `"2"`) are expanded to their `cluster_<n>`
/// label; other text is kept trimmed. Blank cells give the default bucket.
#[must_use]
pub fn parse_cluster(value: &Value) -> String {
    let text = cell_text(value);

    if text.is_empty() {
        return ClusterLabel::DEFAULT.to_string();
    }

    match text.parse::<usize>() {
        Ok(n) if n < ClusterLabel::ALL.len() => ClusterLabel::ALL[n].to_string(),
        _ => text,
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Maps one row onto statistic values. Unrecognized headers are ignored.
///
/// The district name may come back empty; [`import_rows`] rejects that.
#[must_use]
pub fn import_row(row: &Map<String, Value>) -> StatisticValues {
    let mut values = StatisticValues::new(String::new());

    for (header, cell) in row {
        match StatisticColumn::detect(header) {
            Some(StatisticColumn::District) => values.district = cell_text(cell),
            Some(StatisticColumn::ParkArea) => values.park_area = parse_measurement(cell),
            Some(StatisticColumn::CemeteryArea) => values.cemetery_area = parse_measurement(cell),
            Some(StatisticColumn::TotalGreenArea) => {
                values.total_green_area = parse_measurement(cell);
            }
            Some(StatisticColumn::DistrictArea) => values.district_area = parse_measurement(cell),
            Some(StatisticColumn::Cluster) => values.cluster = parse_cluster(cell),
            None => {}
        }
    }

    values
}

/// Imports a batch of spreadsheet rows.
///
/// # Errors
///
/// Returns [`IngestError::Row`] (1-based row number) for the first row
/// that is not an object, has no district name, or repeats a district
/// already seen in the batch.
pub fn import_rows(rows: &[Value]) -> Result<Vec<StatisticValues>, IngestError> {
    let mut seen = HashSet::new();

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let number = i + 1;
            let object = row.as_object().ok_or_else(|| IngestError::Row {
                row: number,
                message: "row must be an object".to_string(),
            })?;

            let values = import_row(object);

            if values.district.is_empty() {
                return Err(IngestError::Row {
                    row: number,
                    message: "district name (KECAMATAN) is required".to_string(),
                });
            }

            if !seen.insert(district_key(&values.district)) {
                return Err(IngestError::Row {
                    row: number,
                    message: format!("duplicate district {:?}", values.district),
                });
            }

            Ok(values)
        })
        .collect()
}
