//! `/api/auth` handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use rth_map_database::{admins, blacklist};
use rth_map_database_models::{AdminRole, AdminRow, NewAdmin};
use rth_map_server_models::{
    AdminData, ApiAdmin, ApiResponse, ChangePasswordRequest, CreateAdminRequest, LoginData,
    LoginRequest,
};

use super::with_connection;
use crate::{AppState, auth::AuthenticatedAdmin, error::ApiError};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

const BAD_CREDENTIALS: &str = "Username atau password salah";

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

/// Whether `username` (already trimmed) has an acceptable length.
#[must_use]
pub fn username_len_ok(username: &str) -> bool {
    (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username.chars().count())
}

/// Checks `password` against `hash` on the blocking pool, without a
/// database connection.
async fn check_password(password: String, hash: String) -> Result<bool, ApiError> {
    Ok(web::block(move || rth_map_auth::verify_password(&password, &hash)).await??)
}

/// Hashes `password` on the blocking pool, without a database connection.
async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    Ok(web::block(move || rth_map_auth::hash_password(&password, cost)).await??)
}

/// `POST /api/auth/login`
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    const MISSING: &str = "Username dan password harus diisi";
    let LoginRequest { username, password } = body.into_inner();
    let username = required(username, MISSING)?;
    let password = required(password, MISSING)?;

    let admin: AdminRow = with_connection(&state, move |conn| {
        admins::find_by_username(conn, &username)?
            .ok_or_else(|| ApiError::Unauthorized(BAD_CREDENTIALS.to_string()))
    })
    .await?;

    if !admin.is_active {
        return Err(ApiError::Unauthorized("Akun admin tidak aktif".to_string()));
    }

    if !check_password(password, admin.password_hash.clone()).await? {
        log::warn!("Failed login for '{}'", admin.username);
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let now = Utc::now();
    let issued = rth_map_auth::issue_token(&state.auth, &admin.id, now)?;
    let id = admin.id.clone();
    with_connection(&state, move |conn| Ok(admins::touch_last_login(conn, &id, now)?)).await?;

    log::info!("{} logged in", admin.username);

    let mut admin = ApiAdmin::from(admin);
    admin.last_login = Some(now);
    let data = LoginData {
        token: issued.token,
        admin,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Login berhasil", data)))
}

/// `GET /api/auth/profile`
pub async fn profile(admin: AuthenticatedAdmin) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(
        "Profil admin",
        AdminData {
            admin: admin.admin.into(),
        },
    ))
}

/// `POST /api/auth/logout`
///
/// Revokes the presented token until it would have expired anyway.
pub async fn logout(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<HttpResponse, ApiError> {
    let username = admin.admin.username.clone();
    with_connection(&state, move |conn| {
        Ok(blacklist::add(conn, &admin.token, admin.claims.exp)?)
    })
    .await?;

    log::info!("{username} logged out");
    Ok(HttpResponse::Ok().json(ApiResponse::message("Logout berhasil")))
}

/// `POST /api/auth/change-password`
pub async fn change_password(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    const MISSING: &str = "Password lama dan password baru harus diisi";
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = body.into_inner();
    let current_password = required(current_password, MISSING)?;
    let new_password = required(new_password, MISSING)?;

    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password baru minimal {MIN_PASSWORD_LEN} karakter"
        )));
    }

    if !check_password(current_password, admin.admin.password_hash.clone()).await? {
        return Err(ApiError::Validation("Password lama tidak benar".to_string()));
    }

    let hash = hash_password(new_password, state.auth.bcrypt_cost).await?;
    let id = admin.admin.id.clone();
    let updated =
        with_connection(&state, move |conn| Ok(admins::update_password(conn, &id, &hash)?)).await?;
    if !updated {
        return Err(ApiError::NotFound("Admin tidak ditemukan".to_string()));
    }

    log::info!("{} changed their password", admin.admin.username);

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password berhasil diubah")))
}

/// `POST /api/auth/create-admin`
///
/// Super admins only.
pub async fn create_admin(
    state: web::Data<AppState>,
    admin: AuthenticatedAdmin,
    body: web::Json<CreateAdminRequest>,
) -> Result<HttpResponse, ApiError> {
    const MISSING: &str = "Username dan password harus diisi";
    admin.require(AdminRole::SuperAdmin)?;

    let CreateAdminRequest {
        username,
        password,
        email,
        role,
    } = body.into_inner();
    let username = required(username, MISSING)?.trim().to_string();
    let password = required(password, MISSING)?;

    if !username_len_ok(&username) {
        return Err(ApiError::Validation(format!(
            "Username harus {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} karakter"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password minimal {MIN_PASSWORD_LEN} karakter"
        )));
    }

    let lookup = username.clone();
    let taken = with_connection(&state, move |conn| {
        Ok(admins::find_by_username(conn, &lookup)?.is_some())
    })
    .await?;
    if taken {
        return Err(ApiError::Validation("Username sudah digunakan".to_string()));
    }

    let password_hash = hash_password(password, state.auth.bcrypt_cost).await?;
    let created = with_connection(&state, move |conn| {
        Ok(admins::insert(
            conn,
            NewAdmin {
                username,
                password_hash,
                email,
                role: role.unwrap_or_default(),
            },
        )?)
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        "Admin berhasil dibuat",
        AdminData {
            admin: created.into(),
        },
    )))
}
