//! `/api/kecamatan` handlers.

use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::{HttpResponse, web};
use rth_map_analysis::{analyze_districts, map_data};
use rth_map_database::{districts, statistics};
use rth_map_database_models::AdminRole;
use rth_map_district_models::FeatureCollection;
use rth_map_server_models::{ApiResponse, CountData};

use super::with_connection;
use crate::{AppState, auth::AuthenticatedAdmin, error::ApiError};

/// Largest accepted boundary upload.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Multipart body of `POST /api/kecamatan/import`.
#[derive(MultipartForm)]
pub struct GeoJsonUpload {
    #[multipart(rename = "geojsonFile", limit = "50MiB")]
    pub geojson_file: TempFile,
}

fn is_geojson_upload(file: &TempFile) -> bool {
    let by_extension = file
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json"));

    let by_mime = file
        .content_type
        .as_ref()
        .is_some_and(|mime| mime.essence_str() == "application/json");

    by_extension || by_mime
}

/// `GET /api/kecamatan` and `GET /api/kecamatan/public`
///
/// Returns every stored boundary as a `FeatureCollection`.
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let features = with_connection(&state, |conn| Ok(districts::list(conn)?)).await?;
    Ok(HttpResponse::Ok().json(FeatureCollection::new(features)))
}

/// `POST /api/kecamatan/import`
///
/// Replaces all boundaries with the features of an uploaded `GeoJSON`
/// file. A malformed feature rejects the whole upload.
pub async fn import(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    MultipartForm(upload): MultipartForm<GeoJsonUpload>,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    if !is_geojson_upload(&upload.geojson_file) {
        return Err(ApiError::Validation(
            "Hanya file GeoJSON (.geojson/.json) yang diperbolehkan".to_string(),
        ));
    }

    let file_name = upload.geojson_file.file_name.clone().unwrap_or_default();
    log::info!(
        "{} is importing '{file_name}' ({} bytes)",
        admin.admin.username,
        upload.geojson_file.size
    );

    let count = with_connection(&state, move |conn| {
        let bytes = std::fs::read(upload.geojson_file.file.path())
            .map_err(|e| ApiError::internal("Failed to read uploaded file", e))?;
        let collection = rth_map_ingest::normalize_bytes(&bytes)?;
        Ok(districts::replace_all(conn, collection.features)?.len())
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        format!("{count} kecamatan berhasil diimpor"),
        CountData { count },
    )))
}

/// `GET /api/kecamatan/map-data`
///
/// Boundaries joined with their RTH statistics, styled by cluster.
pub async fn map(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let collection = with_connection(&state, |conn| {
        let boundaries = districts::list(conn)?;
        let stats = statistics::list(conn)?;
        Ok(map_data(&boundaries, &stats))
    })
    .await?;

    Ok(HttpResponse::Ok().json(collection))
}

/// `PATCH /api/kecamatan/analyze-rth`
///
/// Recolors every boundary from its area metric and stores the colors.
pub async fn analyze(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<HttpResponse, ApiError> {
    admin.require(AdminRole::Admin)?;

    let summary = with_connection(&state, |conn| {
        let mut boundaries = districts::list(conn)?;
        let summary = analyze_districts(&mut boundaries);
        districts::update_colors(conn, &boundaries)?;
        Ok(summary)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        format!("Analisis RTH selesai untuk {} kecamatan", summary.total()),
        summary,
    )))
}
