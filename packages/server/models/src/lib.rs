#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the RTH map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types so the password hash never leaves the
//! server and the API contract can evolve independently.

use chrono::{DateTime, Utc};
use rth_map_database_models::{AdminRole, AdminRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by every write endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A successful response with no payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: String,
    /// Underlying error detail; omitted in production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server and its database are answering.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether the database answered a trivial query.
    pub database: bool,
}

/// An administrator as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAdmin {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminRow> for ApiAdmin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

/// Wraps a single admin as `{ admin: ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminData {
    pub admin: ApiAdmin,
}

/// Body of `POST /api/auth/login`.
///
/// Fields are optional so a missing one can be reported as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub admin: ApiAdmin,
}

/// Body of `POST /api/auth/change-password`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Body of `POST /api/auth/create-admin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAdminRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub role: Option<AdminRole>,
}

/// Body of `POST /api/rth-kecamatan` and `PUT /api/rth-kecamatan/{id}`.
///
/// Every field is optional; an update only touches the fields present.
/// Measurements are kept as raw JSON so numeric strings such as `"12,5"`
/// are accepted the same way the bulk import accepts them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticPatch {
    pub kecamatan: Option<String>,
    pub luas_taman: Option<Value>,
    pub luas_pemakaman: Option<Value>,
    pub total_rth: Option<Value>,
    pub luas_kecamatan: Option<Value>,
    pub cluster: Option<Value>,
}

/// Body of `POST /api/rth-kecamatan/bulk`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkStatisticRequest {
    pub data: Option<Vec<Value>>,
}

/// `{ count }` payload for import endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountData {
    pub count: usize,
}
