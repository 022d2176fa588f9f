//! services/api/src/web/lookup.rs
//!
//! Small lookups used by the viewer: the sections of a resource and the
//! resources of a subject.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_catalog_core::catalog::{catalog_section, CatalogSection};
use study_catalog_core::ports::PortError;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::error::{ErrorBody, JsonError, JsonResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResourceQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubjectQuery {
    pub code: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ResourceSummary {
    pub id: Uuid,
    pub title: String,
}

/// Sections of one resource with their CDN URLs. Unknown ids yield an empty list.
#[utoipa::path(
    get,
    path = "/api/resource",
    params(ResourceQuery),
    responses(
        (status = 200, description = "Sections of the resource", body = Vec<CatalogSection>),
        (status = 400, description = "Missing or malformed id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn resource_sections_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResourceQuery>,
) -> JsonResult<Json<Vec<CatalogSection>>> {
    let raw = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| JsonError::bad_request("Resource id is required"))?;
    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| JsonError::bad_request("Resource id is not a valid id"))?;

    let resource = match state.db.get_resource(id).await {
        Ok(resource) => resource,
        Err(PortError::NotFound(_)) => return Ok(Json(Vec::new())),
        Err(e) => return Err(e.into()),
    };
    let sections = state.db.list_sections_for_resource(id).await?;
    let result = sections
        .iter()
        .map(|s| catalog_section(&state.config.cdn_base, &resource.subject_code, s))
        .collect();
    Ok(Json(result))
}

/// Ids and titles of every resource filed under a subject code.
#[utoipa::path(
    get,
    path = "/api/subject",
    params(SubjectQuery),
    responses(
        (status = 200, description = "Resources of the subject", body = Vec<ResourceSummary>),
        (status = 400, description = "Missing code", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn subject_resources_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubjectQuery>,
) -> JsonResult<Json<Vec<ResourceSummary>>> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| JsonError::bad_request("Code is required"))?;

    let resources = state.db.list_resources_by_subject(code.trim()).await?;
    Ok(Json(
        resources
            .into_iter()
            .map(|r| ResourceSummary {
                id: r.id,
                title: r.title,
            })
            .collect(),
    ))
}
