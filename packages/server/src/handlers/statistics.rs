//! `/api/rth-kecamatan` handlers.

use actix_web::{HttpResponse, web};
use rth_map_database::statistics;
use rth_map_database_models::AdminRole;
use rth_map_district_models::StatisticValues;
use rth_map_ingest::statistics::{parse_cluster, parse_measurement};
use rth_map_server_models::{ApiResponse, BulkStatisticRequest, CountData, StatisticPatch};

use super::with_connection;
use crate::{AppState, auth::AuthenticatedAdmin, error::ApiError};

/// Applies the fields present in `patch` onto `values`.
fn apply_patch(values: &mut StatisticValues, patch: StatisticPatch) -> Result<(), ApiError> {
    if let Some(name) = patch.kecamatan {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(
                "Nama kecamatan harus diisi".to_string(),
            ));
        }
        values.district = name.to_string();
    }

    if let Some(v) = patch.luas_taman {
        values.park_area = parse_measurement(&v);
    }
    if let Some(v) = patch.luas_pemakaman {
        values.cemetery_area = parse_measurement(&v);
    }
    if let Some(v) = patch.total_rth {
        values.total_green_area = parse_measurement(&v);
    }
    if let Some(v) = patch.luas_kecamatan {
        values.district_area = parse_measurement(&v);
    }
    if let Some(v) = patch.cluster {
        values.cluster = parse_cluster(&v);
    }

    Ok(())
}

/// `GET /api/rth-kecamatan` and `GET /api/rth-kecamatan/public`
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = with_connection(&state, |conn| Ok(statistics::list(conn)?)).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// `POST /api/rth-kecamatan`
pub async fn create(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    body: web::Json<StatisticPatch>,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    let patch = body.into_inner();
    if patch.kecamatan.as_deref().is_none_or(|n| n.trim().is_empty()) {
        return Err(ApiError::Validation(
            "Nama kecamatan harus diisi".to_string(),
        ));
    }

    let mut values = StatisticValues::new(String::new());
    apply_patch(&mut values, patch)?;

    let created = with_connection(&state, move |conn| Ok(statistics::insert(conn, values)?)).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        "Data RTH kecamatan berhasil ditambahkan",
        created,
    )))
}

/// `PUT /api/rth-kecamatan/{id}`
///
/// Only the fields present in the body are changed.
pub async fn update(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    path: web::Path<String>,
    body: web::Json<StatisticPatch>,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    let id = path.into_inner();
    let patch = body.into_inner();

    let updated = with_connection(&state, move |conn| {
        let Some(existing) = statistics::get(conn, &id)? else {
            return Ok(None);
        };

        let mut values = existing.values;
        apply_patch(&mut values, patch)?;
        Ok(statistics::update(conn, &id, values)?)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Data tidak ditemukan".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Data RTH kecamatan berhasil diperbarui",
        updated,
    )))
}

/// `DELETE /api/rth-kecamatan/{id}`
pub async fn delete(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    let id = path.into_inner();
    let deleted = with_connection(&state, move |conn| Ok(statistics::delete(conn, &id)?)).await?;

    if !deleted {
        return Err(ApiError::NotFound("Data tidak ditemukan".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("Data berhasil dihapus")))
}

/// `POST /api/rth-kecamatan/bulk`
///
/// Replaces every statistic with the spreadsheet rows in `data`.
pub async fn bulk(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    body: web::Json<BulkStatisticRequest>,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    let rows = body
        .into_inner()
        .data
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| {
            ApiError::Validation(
                "Invalid data format. Expected array of kecamatan data.".to_string(),
            )
        })?;

    let values = rth_map_ingest::import_rows(&rows)?;
    let count = with_connection(&state, move |conn| Ok(statistics::replace_all(conn, values)?)).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        format!("{count} data RTH kecamatan berhasil disimpan"),
        CountData { count },
    )))
}
