//! Table definitions.
//!
//! Boundary geometry is stored as `GeoJSON` TEXT; timestamps are RFC 3339
//! TEXT except blacklist expiry, which is compared numerically.
//! District-name uniqueness for statistics is enforced in the
//! repository, not by an index, so a transactional replace-all can
//! re-insert the same names it just deleted.

use duckdb::Connection;

use crate::DbError;

/// Creates all tables if they do not exist yet.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kecamatan (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            area DOUBLE NOT NULL DEFAULT 0,
            color TEXT NOT NULL,
            geometry TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rth_kecamatan (
            id TEXT PRIMARY KEY,
            kecamatan TEXT NOT NULL,
            name_key TEXT NOT NULL,
            luas_taman DOUBLE NOT NULL DEFAULT 0,
            luas_pemakaman DOUBLE NOT NULL DEFAULT 0,
            total_rth DOUBLE NOT NULL DEFAULT 0,
            luas_kecamatan DOUBLE NOT NULL DEFAULT 0,
            cluster TEXT NOT NULL DEFAULT 'cluster_0',
            tanggal_update TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS admins (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT,
            role TEXT NOT NULL DEFAULT 'admin',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            last_login TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS token_blacklist (
            token TEXT PRIMARY KEY,
            expires_at BIGINT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )?;

    Ok(())
}
