//! Storage for administrator accounts (`admins` table).

use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use rth_map_database_models::{AdminRole, AdminRow, NewAdmin};

use crate::{DbError, parse_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, username, password_hash, email, role, is_active, \
     last_login, created_at FROM admins";

type RawAdmin = (
    String,
    String,
    String,
    Option<String>,
    String,
    bool,
    Option<String>,
    String,
);

fn query_one<P: duckdb::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<AdminRow>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let raw: Option<RawAdmin> = stmt
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
        .next()
        .transpose()?;

    raw.map(from_raw).transpose()
}

fn from_raw(
    (id, username, password_hash, email, role, is_active, last_login, created_at): RawAdmin,
) -> Result<AdminRow, DbError> {
    let role = role.parse::<AdminRole>().map_err(|e| DbError::Conversion {
        message: format!("unknown admin role '{role}': {e}"),
    })?;

    Ok(AdminRow {
        id,
        username,
        password_hash,
        email,
        role,
        is_active,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Looks up an administrator by login name (case-insensitive).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<AdminRow>, DbError> {
    query_one(
        conn,
        &format!("{SELECT_COLUMNS} WHERE username = ?"),
        params![username.trim().to_lowercase()],
    )
}

/// Looks up an administrator by id.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<AdminRow>, DbError> {
    query_one(conn, &format!("{SELECT_COLUMNS} WHERE id = ?"), params![id])
}

/// Inserts a new administrator. Username and email are stored lowercased.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the username is already taken, or
/// [`DbError`] if the insert fails.
pub fn insert(conn: &mut Connection, admin: NewAdmin) -> Result<AdminRow, DbError> {
    let tx = conn.transaction()?;

    let username = admin.username.trim().to_lowercase();
    let taken: i64 = tx.query_row(
        "SELECT COUNT(*) FROM admins WHERE username = ?",
        params![username],
        |row| row.get(0),
    )?;
    if taken > 0 {
        return Err(DbError::Duplicate {
            entity: "Username",
            key: username,
        });
    }

    let row = AdminRow {
        id: uuid::Uuid::new_v4().to_string(),
        username,
        password_hash: admin.password_hash,
        email: admin
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty()),
        role: admin.role,
        is_active: true,
        last_login: None,
        created_at: Utc::now(),
    };

    tx.execute(
        "INSERT INTO admins (id, username, password_hash, email, role, is_active, last_login, created_at)
         VALUES (?, ?, ?, ?, ?, ?, NULL, ?)",
        params![
            row.id,
            row.username,
            row.password_hash,
            row.email,
            row.role.as_ref(),
            row.is_active,
            row.created_at.to_rfc3339(),
        ],
    )?;

    tx.commit()?;

    log::info!("Created {} account '{}'", row.role, row.username);
    Ok(row)
}

/// Replaces the stored password hash. Returns whether the account exists.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn update_password(conn: &Connection, id: &str, password_hash: &str) -> Result<bool, DbError> {
    Ok(conn.execute(
        "UPDATE admins SET password_hash = ? WHERE id = ?",
        params![password_hash, id],
    )? > 0)
}

/// Records a successful login.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn touch_last_login(conn: &Connection, id: &str, at: DateTime<Utc>) -> Result<(), DbError> {
    conn.execute(
        "UPDATE admins SET last_login = ? WHERE id = ?",
        params![at.to_rfc3339(), id],
    )?;
    Ok(())
}

/// Activates or deactivates an account. Returns whether the account exists.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn set_active(conn: &Connection, id: &str, is_active: bool) -> Result<bool, DbError> {
    Ok(conn.execute(
        "UPDATE admins SET is_active = ? WHERE id = ?",
        params![is_active, id],
    )? > 0)
}

/// Counts administrator accounts.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("negative admin count: {e}"),
    })
}
