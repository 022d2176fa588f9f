//! services/api/src/web/error.rs
//!
//! HTTP error responses. Public routes answer `{ "error": ... }`, admin routes
//! answer `{ "success": false, "message": ... }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use study_catalog_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

/// Body of every failed public request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of every failed admin request.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminFailure {
    pub success: bool,
    pub message: String,
}

/// Maps a port error onto a status and a client-facing message. Unexpected
/// errors are logged here and hidden from the client.
fn describe(err: &PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        PortError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Upstream { status } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Upstream responded with status {status}"),
        ),
        PortError::Unexpected(msg) => {
            error!("Unexpected error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

//=========================================================================================
// Public errors
//=========================================================================================

#[derive(Debug)]
pub struct JsonError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<PortError> for JsonError {
    fn from(err: PortError) -> Self {
        let (status, message) = describe(&err);
        Self { status, message }
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub type JsonResult<T> = Result<T, JsonError>;

//=========================================================================================
// Admin errors
//=========================================================================================

#[derive(Debug)]
pub struct AdminError {
    pub status: StatusCode,
    pub message: String,
}

impl AdminError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<PortError> for AdminError {
    fn from(err: PortError) -> Self {
        let (status, message) = describe(&err);
        Self { status, message }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let body = AdminFailure {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Unwraps an admin JSON body, answering a malformed one in the admin shape
/// instead of axum's plain-text rejection.
pub fn payload<T>(body: Result<Json<T>, JsonRejection>) -> AdminResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| AdminError::new(StatusCode::BAD_REQUEST, e.body_text()))
}
