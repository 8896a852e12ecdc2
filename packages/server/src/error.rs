//! Mapping of library errors onto HTTP responses.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, ResponseError, web};
use rth_map_auth::AuthError;
use rth_map_database::DbError;
use rth_map_ingest::IngestError;
use rth_map_server_models::ApiErrorBody;
use thiserror::Error;

use crate::AppState;

/// Error returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, expired or revoked credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Anything else. `message` is safe to show; `detail` is not.
    #[error("{message}: {detail}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Builds the JSON body, including internal detail only when asked.
    #[must_use]
    pub fn body(&self, expose_details: bool) -> ApiErrorBody {
        match self {
            Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message) => ApiErrorBody {
                success: false,
                message: message.clone(),
                error: None,
            },
            Self::Internal { message, detail } => ApiErrorBody {
                success: false,
                message: message.clone(),
                error: expose_details.then(|| detail.clone()),
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Internal { .. } = self {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(self.body(false))
    }
}

/// Middleware that adds internal error detail to 500 responses outside
/// production.
///
/// [`ApiError`] renders without detail; this re-renders it with detail
/// when the app's [`AppState`] is not marked as production.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, expose_internal_detail)
}

#[allow(clippy::unnecessary_wraps)]
fn expose_internal_detail<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let expose = res
        .request()
        .app_data::<web::Data<AppState>>()
        .is_some_and(|state| !state.production);

    let body = res
        .response()
        .error()
        .and_then(|e| e.as_error::<ApiError>())
        .filter(|_| expose)
        .map(|e| e.body(true));

    let Some(body) = body else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(body);
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Duplicate { .. } => Self::Validation(e.to_string()),
            e => Self::internal("Server Error", e),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Expired | AuthError::Invalid => Self::Unauthorized(e.to_string()),
            e => Self::internal("Server Error", e),
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        Self::internal("Server Error", e)
    }
}
