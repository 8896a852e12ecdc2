//! HTTP handler functions for the RTH map API.

pub mod accounts;
pub mod districts;
pub mod statistics;

use actix_web::{HttpResponse, web};
use duckdb::Connection;
use rth_map_server_models::{ApiErrorBody, ApiHealth};

use crate::{AppState, error::ApiError};

/// Runs `f` on a pooled connection on the blocking thread pool.
pub(crate) async fn with_connection<T, F>(
    state: &web::Data<AppState>,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    web::block(move || {
        let mut conn = state.pool.acquire()?;
        f(&mut conn)
    })
    .await?
}

/// `GET /api/health`
///
/// Reports 503 when the database does not answer.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let pool = state.pool.clone();
    let database = match web::block(move || pool.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::error!("Health check query failed: {e}");
            false
        }
        Err(e) => {
            log::error!("Health check could not run: {e}");
            false
        }
    };

    let body = ApiHealth {
        healthy: database,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    };

    if database {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiErrorBody {
        success: false,
        message: "Route not found".to_string(),
        error: None,
    })
}
