//! Bearer-token authentication for protected routes.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use rth_map_auth::Claims;
use rth_map_database::{admins, blacklist};
use rth_map_database_models::{AdminRole, AdminRow};

use crate::{AppState, error::ApiError};

/// The administrator behind a valid bearer token.
///
/// Extracting this rejects the request with 401 when the token is
/// missing, revoked, expired, invalid, or belongs to an unknown or
/// deactivated account.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub admin: AdminRow,
    /// The raw bearer token, kept for logout.
    pub token: String,
    pub claims: Claims,
}

impl AuthenticatedAdmin {
    /// Rejects with 403 unless the admin's role grants `required`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] when the role is insufficient.
    pub fn require(&self, required: AdminRole) -> Result<(), ApiError> {
        if self.admin.role.satisfies(required) {
            return Ok(());
        }

        Err(ApiError::Forbidden(match required {
            AdminRole::Admin => "Access denied. Admin role required.".to_string(),
            AdminRole::SuperAdmin => "Access denied. Super admin role required.".to_string(),
        }))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Access denied. No token provided.".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Access denied. Invalid token format.".to_string()))
}

/// Resolves `token` to its administrator.
fn authenticate(state: &AppState, token: String) -> Result<AuthenticatedAdmin, ApiError> {
    let conn = state.pool.acquire()?;

    if blacklist::contains(&conn, &token, chrono::Utc::now().timestamp())? {
        return Err(ApiError::Unauthorized(
            "Token has been invalidated.".to_string(),
        ));
    }

    let claims = rth_map_auth::verify_token(&state.auth, &token)?;

    let admin = admins::find_by_id(&conn, &claims.admin_id)?.ok_or_else(|| {
        ApiError::Unauthorized("Token is valid but admin not found.".to_string())
    })?;

    if !admin.is_active {
        return Err(ApiError::Unauthorized(
            "Admin account is deactivated.".to_string(),
        ));
    }

    Ok(AuthenticatedAdmin {
        admin,
        token,
        claims,
    })
}

impl FromRequest for AuthenticatedAdmin {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| {
                ApiError::internal("Server Error", "application state is not configured")
            })?;

            web::block(move || authenticate(&state, token)).await?
        })
    }
}
