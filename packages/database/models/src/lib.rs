#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types for dashboard administrators.
//!
//! These types represent administrator accounts as stored in and
//! retrieved from the database. The API view of an administrator lives in
//! `rth_map_server_models` and never carries the password hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Permission level of an administrator account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdminRole {
    /// Can manage district and statistic data.
    #[default]
    Admin,
    /// Can additionally create other administrators.
    SuperAdmin,
}

impl AdminRole {
    /// Whether this role grants at least the permissions of `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

/// An administrator row as retrieved from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    /// Primary key.
    pub id: String,
    /// Lowercased, unique login name.
    pub username: String,
    /// Bcrypt hash of the password.
    pub password_hash: String,
    /// Optional lowercased contact email.
    pub email: Option<String>,
    pub role: AdminRole,
    /// Deactivated accounts cannot log in or use existing tokens.
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a new administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub role: AdminRole,
}
