//! Storage for district boundary features (`kecamatan` table).

use duckdb::{Connection, params};
use rth_map_district_models::{DistrictFeature, DistrictGeometry, DistrictProperties};

use crate::DbError;

/// Lists all stored districts in upload order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored geometry cannot be
/// decoded.
pub fn list(conn: &Connection) -> Result<Vec<DistrictFeature>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, area, color, geometry FROM kecamatan ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, name, area, color, geometry)| {
            let geometry: DistrictGeometry = serde_json::from_str(&geometry)?;
            Ok(DistrictFeature {
                id: Some(id),
                properties: DistrictProperties { name, area, color },
                geometry,
            })
        })
        .collect()
}

/// Counts stored districts.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM kecamatan", [], |row| row.get(0))?;
    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("negative district count: {e}"),
    })
}

/// Replaces every stored district with `features`, in one transaction.
///
/// Fresh ids are assigned; ids on the input are ignored. If anything
/// fails the previous districts stay in place.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails; the transaction is rolled
/// back.
pub fn replace_all(
    conn: &mut Connection,
    features: Vec<DistrictFeature>,
) -> Result<Vec<DistrictFeature>, DbError> {
    let tx = conn.transaction()?;

    let deleted = tx.execute("DELETE FROM kecamatan", [])?;

    let stored = {
        let mut stmt = tx.prepare(
            "INSERT INTO kecamatan (id, position, name, area, color, geometry)
             VALUES (?, ?, ?, ?, ?, ?)",
        )?;

        features
            .into_iter()
            .enumerate()
            .map(|(position, mut feature)| {
                let id = uuid::Uuid::new_v4().to_string();
                let geometry = serde_json::to_string(&feature.geometry)?;
                let position = i64::try_from(position).map_err(|e| DbError::Conversion {
                    message: format!("district position out of range: {e}"),
                })?;

                stmt.execute(params![
                    id,
                    position,
                    feature.properties.name,
                    feature.properties.area,
                    feature.properties.color,
                    geometry,
                ])?;

                feature.id = Some(id);
                Ok(feature)
            })
            .collect::<Result<Vec<_>, DbError>>()?
    };

    tx.commit()?;

    log::info!("Replaced {deleted} districts with {}", stored.len());
    Ok(stored)
}

/// Writes the display color of each feature back to storage.
///
/// Features without an id are skipped.
///
/// # Errors
///
/// Returns [`DbError`] if any update fails; the transaction is rolled
/// back.
pub fn update_colors(conn: &mut Connection, features: &[DistrictFeature]) -> Result<usize, DbError> {
    let tx = conn.transaction()?;

    let updated = {
        let mut stmt = tx.prepare("UPDATE kecamatan SET color = ? WHERE id = ?")?;
        let mut updated = 0;
        for feature in features {
            if let Some(id) = &feature.id {
                updated += stmt.execute(params![feature.properties.color, id])?;
            }
        }
        updated
    };

    tx.commit()?;
    Ok(updated)
}
