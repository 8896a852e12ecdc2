//! Revoked JWTs (`token_blacklist` table).
//!
//! Entries carry the token's own expiry so they can be purged once the
//! token would be rejected anyway.

use chrono::Utc;
use duckdb::{Connection, params};

use crate::DbError;

/// Revokes `token` until `expires_at` (unix seconds). Revoking the same
/// token twice is a no-op.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub fn add(conn: &Connection, token: &str, expires_at: i64) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR IGNORE INTO token_blacklist (token, expires_at, created_at) VALUES (?, ?, ?)",
        params![token, expires_at, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Whether `token` is revoked and the revocation has not yet expired.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn contains(conn: &Connection, token: &str, now: i64) -> Result<bool, DbError> {
    let hits: i64 = conn.query_row(
        "SELECT COUNT(*) FROM token_blacklist WHERE token = ? AND expires_at > ?",
        params![token, now],
        |row| row.get(0),
    )?;
    Ok(hits > 0)
}

/// Deletes entries whose expiry is at or before `now`. Returns how many
/// were removed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize, DbError> {
    Ok(conn.execute(
        "DELETE FROM token_blacklist WHERE expires_at <= ?",
        params![now],
    )?)
}
