//! services/api/src/web/auth.rs
//!
//! Admin login and logout. A single shared password is checked against an
//! argon2 hash; a successful login stores a session row and hands its id out
//! as the `admin_session` cookie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{payload, AdminError, AdminFailure, AdminResult};
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

fn session_lifetime() -> Duration {
    Duration::hours(12)
}

//=========================================================================================
// Password Hashing
//=========================================================================================

/// Hashes `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks `password` against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Pulls the admin session id out of the `Cookie` header, if any.
pub fn session_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
}

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /admin/login - Start an admin session
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; the session cookie is set", body = LoginResponse),
        (status = 400, description = "Malformed body", body = AdminFailure),
        (status = 401, description = "Wrong password", body = AdminFailure),
        (status = 500, description = "Internal server error", body = AdminFailure)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AdminResult<impl IntoResponse> {
    let req = payload(body)?;
    let valid = verify_password(&req.password, &state.config.admin_password_hash).map_err(|e| {
        error!("Failed to verify admin password: {:?}", e);
        AdminError::new(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;
    if !valid {
        warn!("Rejected admin login");
        return Err(AdminError::new(StatusCode::UNAUTHORIZED, "Invalid password"));
    }

    let session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + session_lifetime();
    state
        .db
        .create_admin_session(&session_id, expires_at)
        .await?;
    info!("Admin logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={session_id}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_lifetime().num_seconds()
    );
    let body = LoginResponse {
        success: true,
        message: "Logged in.".to_string(),
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)))
}

/// POST /admin/logout - End the admin session
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 200, description = "Logged out; the session cookie is cleared", body = LoginResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AdminResult<impl IntoResponse> {
    if let Some(session_id) = session_from_headers(&headers) {
        state.db.delete_admin_session(session_id).await?;
        info!("Admin logged out");
    }

    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0");
    let body = LoginResponse {
        success: true,
        message: "Logged out.".to_string(),
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)))
}
