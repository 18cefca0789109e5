use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;
use crate::user::errors::UserError;

pub mod authenticate;
pub mod get_me;
pub mod ping_application;
pub mod ping_auth;
pub mod ping_database;

/// Fixed messages returned by the health endpoints.
pub mod ping_messages {
    pub const OK: &str = "Application worked!";
    pub const DB_ERROR: &str = "Database isn't working";
}

/// Body shape shared by all health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PingResponse {
    pub fn ok() -> Self {
        Self {
            message: ping_messages::OK,
            detail: None,
        }
    }

    pub fn ok_with_detail(detail: impl Into<String>) -> Self {
        Self {
            message: ping_messages::OK,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    /// DB probe failed; surfaced immediately with a fixed message.
    DependencyUnavailable(String),
    /// Uniform credential failure; response carries a `WWW-Authenticate`
    /// hint and never distinguishes the underlying cause.
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::DependencyUnavailable(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let mut response =
            (status, Json(ApiErrorBody::new(status, message))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            AuthError::Password(_) | AuthError::Token(_) | AuthError::User(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub status_code: u16,
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            message,
        }
    }
}
