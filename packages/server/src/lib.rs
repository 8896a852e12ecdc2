#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the RTH map application.
//!
//! Serves district boundaries, RTH statistics, and the merged map layer
//! for the dashboard, plus the admin endpoints that upload and edit them.
//! All state lives in one `DuckDB` file behind a [`DbPool`]. The built
//! frontend is served from `STATIC_DIR` when present.

pub mod auth;
pub mod config;
pub mod error;
mod handlers;
pub mod interactive;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, middleware, web};
use rth_map_auth::AuthConfig;
use rth_map_database::{DbPool, blacklist};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// How often expired revoked tokens are deleted.
pub const BLACKLIST_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Largest accepted JSON body (bulk statistic uploads).
const MAX_JSON_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    /// Pool of connections to the application database.
    pub pool: Arc<DbPool>,
    /// Token signing and password hashing settings.
    pub auth: AuthConfig,
    /// Hides internal error detail from responses.
    pub production: bool,
}

impl AppState {
    #[must_use]
    pub const fn new(pool: Arc<DbPool>, auth: AuthConfig, production: bool) -> Self {
        Self {
            pool,
            auth,
            production,
        }
    }
}

/// Registers the `/api` routes and their body extractor limits.
///
/// Does not register application state or the fallback service; see
/// [`run_server`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(multipart_config(handlers::districts::MAX_UPLOAD_BYTES))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/kecamatan")
                    .route("", web::get().to(handlers::districts::list))
                    .route("/public", web::get().to(handlers::districts::list))
                    .route("/import", web::post().to(handlers::districts::import))
                    .route("/map-data", web::get().to(handlers::districts::map))
                    .route("/analyze-rth", web::patch().to(handlers::districts::analyze)),
            )
            .service(
                web::scope("/rth-kecamatan")
                    .route("", web::get().to(handlers::statistics::list))
                    .route("", web::post().to(handlers::statistics::create))
                    .route("/public", web::get().to(handlers::statistics::list))
                    .route("/bulk", web::post().to(handlers::statistics::bulk))
                    .route("/{id}", web::put().to(handlers::statistics::update))
                    .route("/{id}", web::delete().to(handlers::statistics::delete)),
            )
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(handlers::accounts::login))
                    .route("/profile", web::get().to(handlers::accounts::profile))
                    .route("/logout", web::post().to(handlers::accounts::logout))
                    .route(
                        "/change-password",
                        web::post().to(handlers::accounts::change_password),
                    )
                    .route(
                        "/create-admin",
                        web::post().to(handlers::accounts::create_admin),
                    ),
            ),
    );
}

/// Multipart limits for uploads; oversized or malformed bodies are
/// rejected with 400.
#[must_use]
pub fn multipart_config(total_limit: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(total_limit)
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

/// Fallback handler for requests no route matched.
pub fn not_found_service() -> actix_web::Route {
    web::to(handlers::not_found)
}

/// Periodically deletes revoked tokens whose expiry has passed.
///
/// Must be called from within an actix system.
pub fn spawn_blacklist_purge(pool: Arc<DbPool>) {
    actix_rt::spawn(async move {
        let mut interval = tokio::time::interval(BLACKLIST_PURGE_INTERVAL);

        loop {
            interval.tick().await;

            let pool = pool.clone();
            let purged = web::block(move || {
                let conn = pool.acquire()?;
                blacklist::purge_expired(&conn, chrono::Utc::now().timestamp())
            })
            .await;

            match purged {
                Ok(Ok(0)) => {}
                Ok(Ok(count)) => log::info!("Purged {count} expired revoked tokens"),
                Ok(Err(e)) => log::error!("Failed to purge token blacklist: {e}"),
                Err(e) => log::error!("Token blacklist purge did not run: {e}"),
            }
        }
    });
}

/// Starts the RTH map API server.
///
/// Opens the database (creating the schema if needed), starts the
/// blacklist purge task, and runs the Actix-Web HTTP server. The caller
/// is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened or
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Opening database...");
    let pool = DbPool::open(&config.database_path, config.db_pool_size)
        .map_err(std::io::Error::other)?;
    log::info!("Database pool ready with {} connections", pool.size());

    let state = web::Data::new(AppState::new(
        Arc::new(pool),
        config.auth.clone(),
        config.production,
    ));

    spawn_blacklist_purge(state.pool.clone());

    let static_dir = config
        .static_dir
        .is_dir()
        .then(|| config.static_dir.clone());
    match &static_dir {
        Some(dir) => log::info!("Serving frontend from {}", dir.display()),
        None => log::info!(
            "No frontend at {}; serving the API only",
            config.static_dir.display()
        ),
    }

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(error::error_handlers())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .default_service(not_found_service());

        // Serve frontend static files (production)
        match &static_dir {
            Some(dir) => app.service(
                Files::new("/", dir.clone())
                    .index_file("index.html")
                    .default_handler(not_found_service()),
            ),
            None => app,
        }
    })
    .bind((config.bind_addr.clone(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod api_tests;
