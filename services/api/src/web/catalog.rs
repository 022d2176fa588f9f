//! services/api/src/web/catalog.rs
//!
//! The catalog endpoints clients poll to keep their local copy current.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use study_catalog_core::catalog::{self, CatalogPayload};
use tracing::instrument;
use utoipa::ToSchema;

use crate::web::error::{ErrorBody, JsonResult};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct ChecksumResponse {
    pub checksum: String,
}

/// The full subject, resource and section tree with its checksum.
///
/// The checksum is the stored one, the same value `/api/catalog/checksum`
/// serves, so a client that cached this response matches on its next check.
#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "The catalog", body = CatalogPayload),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn catalog_handler(State(state): State<Arc<AppState>>) -> JsonResult<Json<CatalogPayload>> {
    let checksum = catalog::current_checksum(state.db.as_ref(), &state.config.cdn_base).await?;
    let data = catalog::load_catalog(state.db.as_ref(), &state.config.cdn_base).await?;
    Ok(Json(CatalogPayload { checksum, data }))
}

/// The checksum of the stored catalog.
#[utoipa::path(
    get,
    path = "/api/catalog/checksum",
    responses(
        (status = 200, description = "Current catalog checksum", body = ChecksumResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn checksum_handler(
    State(state): State<Arc<AppState>>,
) -> JsonResult<Json<ChecksumResponse>> {
    let checksum = catalog::current_checksum(state.db.as_ref(), &state.config.cdn_base).await?;
    Ok(Json(ChecksumResponse { checksum }))
}
