//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting the admin routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use study_catalog_core::ports::PortError;
use tracing::{debug, error};

use crate::web::auth::session_from_headers;
use crate::web::error::{AdminError, AdminResult};
use crate::web::state::AppState;

/// Middleware that validates the admin session cookie.
///
/// Missing, unknown or expired sessions are answered with 401 before the
/// handler runs.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> AdminResult<Response> {
    let unauthorized = || AdminError::new(StatusCode::UNAUTHORIZED, "Unauthorized");

    let session_id = session_from_headers(req.headers()).ok_or_else(unauthorized)?;

    match state.db.validate_admin_session(session_id).await {
        Ok(()) => {}
        Err(PortError::Unauthorized) => {
            debug!("Rejected unknown or expired admin session");
            return Err(unauthorized());
        }
        Err(e) => {
            error!("Failed to validate admin session: {:?}", e);
            return Err(e.into());
        }
    }

    Ok(next.run(req).await)
}
