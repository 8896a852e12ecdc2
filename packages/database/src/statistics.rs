//! Storage for RTH statistics (`rth_kecamatan` table).
//!
//! Each district name key may appear on at most one row. The check runs
//! inside the same transaction as the write.

use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use rth_map_district_models::{DistrictStatistic, StatisticValues, district_key};

use crate::{DbError, parse_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, kecamatan, luas_taman, luas_pemakaman, total_rth, \
     luas_kecamatan, cluster, tanggal_update FROM rth_kecamatan";

type RawStatistic = (String, String, f64, f64, f64, f64, String, String);

fn query<P: duckdb::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<DistrictStatistic>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<RawStatistic> = stmt
        .query_map(params, |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(id, district, park, cemetery, total, area, cluster, updated_at)| {
                Ok(DistrictStatistic {
                    id,
                    values: StatisticValues {
                        district,
                        park_area: park,
                        cemetery_area: cemetery,
                        total_green_area: total,
                        district_area: area,
                        cluster,
                    },
                    updated_at: parse_timestamp(&updated_at)?,
                })
            },
        )
        .collect()
}

/// Lists all statistics sorted by district name.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn list(conn: &Connection) -> Result<Vec<DistrictStatistic>, DbError> {
    query(conn, &format!("{SELECT_COLUMNS} ORDER BY kecamatan"), [])
}

/// Fetches one statistic by id.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get(conn: &Connection, id: &str) -> Result<Option<DistrictStatistic>, DbError> {
    Ok(query(conn, &format!("{SELECT_COLUMNS} WHERE id = ?"), params![id])?
        .into_iter()
        .next())
}

fn ensure_unique_name(conn: &Connection, name_key: &str, except_id: &str) -> Result<(), DbError> {
    let taken: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rth_kecamatan WHERE name_key = ? AND id <> ?",
        params![name_key, except_id],
        |row| row.get(0),
    )?;

    if taken > 0 {
        return Err(DbError::Duplicate {
            entity: "RTH statistic for district",
            key: name_key.to_string(),
        });
    }

    Ok(())
}

fn insert_row(
    conn: &Connection,
    id: &str,
    values: &StatisticValues,
    updated_at: DateTime<Utc>,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO rth_kecamatan (id, kecamatan, name_key, luas_taman, luas_pemakaman,
             total_rth, luas_kecamatan, cluster, tanggal_update)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            values.district,
            district_key(&values.district),
            values.park_area,
            values.cemetery_area,
            values.total_green_area,
            values.district_area,
            values.cluster,
            updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Inserts a new statistic.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if another row already covers the same
/// district, or [`DbError`] if the insert fails.
pub fn insert(
    conn: &mut Connection,
    values: StatisticValues,
) -> Result<DistrictStatistic, DbError> {
    let tx = conn.transaction()?;

    ensure_unique_name(&tx, &district_key(&values.district), "")?;

    let statistic = DistrictStatistic {
        id: uuid::Uuid::new_v4().to_string(),
        values,
        updated_at: Utc::now(),
    };
    insert_row(&tx, &statistic.id, &statistic.values, statistic.updated_at)?;

    tx.commit()?;
    Ok(statistic)
}

/// Overwrites the values of the statistic with `id`.
///
/// Returns `None` if no such row exists.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the new name collides with another
/// row, or [`DbError`] if the update fails.
pub fn update(
    conn: &mut Connection,
    id: &str,
    values: StatisticValues,
) -> Result<Option<DistrictStatistic>, DbError> {
    let tx = conn.transaction()?;

    ensure_unique_name(&tx, &district_key(&values.district), id)?;

    let updated_at = Utc::now();
    let changed = tx.execute(
        "UPDATE rth_kecamatan SET kecamatan = ?, name_key = ?, luas_taman = ?,
             luas_pemakaman = ?, total_rth = ?, luas_kecamatan = ?, cluster = ?,
             tanggal_update = ?
         WHERE id = ?",
        params![
            values.district,
            district_key(&values.district),
            values.park_area,
            values.cemetery_area,
            values.total_green_area,
            values.district_area,
            values.cluster,
            updated_at.to_rfc3339(),
            id,
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }

    tx.commit()?;

    Ok(Some(DistrictStatistic {
        id: id.to_string(),
        values,
        updated_at,
    }))
}

/// Deletes the statistic with `id`. Returns whether a row was removed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn delete(conn: &Connection, id: &str) -> Result<bool, DbError> {
    Ok(conn.execute("DELETE FROM rth_kecamatan WHERE id = ?", params![id])? > 0)
}

/// Replaces every statistic with `rows`, in one transaction.
///
/// The caller is expected to have rejected duplicate names already; they
/// are checked again here and fail the whole replace.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails; the previous rows are kept.
pub fn replace_all(conn: &mut Connection, rows: Vec<StatisticValues>) -> Result<usize, DbError> {
    let tx = conn.transaction()?;

    let deleted = tx.execute("DELETE FROM rth_kecamatan", [])?;

    let updated_at = Utc::now();
    for values in &rows {
        ensure_unique_name(&tx, &district_key(&values.district), "")?;
        insert_row(&tx, &uuid::Uuid::new_v4().to_string(), values, updated_at)?;
    }

    tx.commit()?;

    log::info!("Replaced {deleted} RTH statistics with {}", rows.len());
    Ok(rows.len())
}
