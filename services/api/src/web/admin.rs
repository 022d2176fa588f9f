//! services/api/src/web/admin.rs
//!
//! Catalog management endpoints behind the admin session. Every mutation
//! answers with a `MutationOutcome` listing the browse paths it made stale and
//! the refreshed catalog checksum.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use study_catalog_core::admin::MutationOutcome;
use study_catalog_core::domain::{
    NewResource, NewSection, NewSubject, Resource, ResourceUpdate, Section, Subject, SubjectUpdate,
};
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::web::error::{payload, AdminError, AdminFailure, AdminResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
    /// Only resources of this subject.
    pub subject_code: Option<String>,
}

fn parse_id(raw: &str) -> AdminResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AdminError::new(StatusCode::BAD_REQUEST, format!("Invalid id '{raw}'")))
}

//=========================================================================================
// Subjects
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/subjects",
    responses(
        (status = 200, description = "Every stored subject", body = Vec<Subject>),
        (status = 401, description = "Not logged in", body = AdminFailure)
    )
)]
pub async fn list_subjects_handler(
    State(state): State<Arc<AppState>>,
) -> AdminResult<Json<Vec<Subject>>> {
    Ok(Json(state.db.list_subjects().await?))
}

#[utoipa::path(
    post,
    path = "/admin/subjects",
    request_body = NewSubject,
    responses(
        (status = 201, description = "Subject added", body = MutationOutcome),
        (status = 400, description = "Invalid subject", body = AdminFailure),
        (status = 409, description = "Code or slug already used", body = AdminFailure)
    )
)]
#[instrument(skip_all)]
pub async fn create_subject_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSubject>, JsonRejection>,
) -> AdminResult<impl IntoResponse> {
    let outcome = state.admin().add_subject(payload(body)?).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    put,
    path = "/admin/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    request_body = SubjectUpdate,
    responses(
        (status = 200, description = "Subject updated", body = MutationOutcome),
        (status = 400, description = "Invalid update", body = AdminFailure),
        (status = 404, description = "Unknown subject", body = AdminFailure)
    )
)]
#[instrument(skip(state, body))]
pub async fn update_subject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SubjectUpdate>, JsonRejection>,
) -> AdminResult<Json<MutationOutcome>> {
    let id = parse_id(&id)?;
    let outcome = state.admin().update_subject(id, payload(body)?).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    delete,
    path = "/admin/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject and its resources deleted", body = MutationOutcome),
        (status = 404, description = "Unknown subject", body = AdminFailure)
    )
)]
#[instrument(skip(state))]
pub async fn delete_subject_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AdminResult<Json<MutationOutcome>> {
    let outcome = state.admin().delete_subject(parse_id(&id)?).await?;
    Ok(Json(outcome))
}

//=========================================================================================
// Resources
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/resources",
    params(ResourceFilter),
    responses(
        (status = 200, description = "Resources, newest first", body = Vec<Resource>),
        (status = 401, description = "Not logged in", body = AdminFailure)
    )
)]
pub async fn list_resources_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ResourceFilter>,
) -> AdminResult<Json<Vec<Resource>>> {
    let resources = match filter.subject_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => state.db.list_resources_by_subject(code).await?,
        _ => state.db.list_resources().await?,
    };
    Ok(Json(resources))
}

#[utoipa::path(
    post,
    path = "/admin/resources",
    request_body = NewResource,
    responses(
        (status = 201, description = "Resource added", body = MutationOutcome),
        (status = 400, description = "Invalid resource or unknown subject", body = AdminFailure)
    )
)]
#[instrument(skip_all)]
pub async fn create_resource_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewResource>, JsonRejection>,
) -> AdminResult<impl IntoResponse> {
    let outcome = state.admin().add_resource(payload(body)?).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    put,
    path = "/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = ResourceUpdate,
    responses(
        (status = 200, description = "Resource updated", body = MutationOutcome),
        (status = 400, description = "Invalid update", body = AdminFailure),
        (status = 404, description = "Unknown resource", body = AdminFailure)
    )
)]
#[instrument(skip(state, body))]
pub async fn update_resource_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ResourceUpdate>, JsonRejection>,
) -> AdminResult<Json<MutationOutcome>> {
    let id = parse_id(&id)?;
    let outcome = state.admin().update_resource(id, payload(body)?).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    delete,
    path = "/admin/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource deleted", body = MutationOutcome),
        (status = 404, description = "Unknown resource", body = AdminFailure)
    )
)]
#[instrument(skip(state))]
pub async fn delete_resource_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AdminResult<Json<MutationOutcome>> {
    let outcome = state.admin().delete_resource(parse_id(&id)?).await?;
    Ok(Json(outcome))
}

//=========================================================================================
// Sections
//=========================================================================================

#[utoipa::path(
    get,
    path = "/admin/resources/{id}/sections",
    params(("id" = Uuid, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Sections by position", body = Vec<Section>),
        (status = 401, description = "Not logged in", body = AdminFailure)
    )
)]
pub async fn list_sections_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AdminResult<Json<Vec<Section>>> {
    let sections = state.db.list_sections_for_resource(parse_id(&id)?).await?;
    Ok(Json(sections))
}

#[utoipa::path(
    post,
    path = "/admin/resources/{id}/sections",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = NewSection,
    responses(
        (status = 201, description = "Section added", body = MutationOutcome),
        (status = 400, description = "Invalid section", body = AdminFailure),
        (status = 404, description = "Unknown resource", body = AdminFailure)
    )
)]
#[instrument(skip(state, body))]
pub async fn create_section_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<NewSection>, JsonRejection>,
) -> AdminResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let outcome = state.admin().add_section(id, payload(body)?).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    delete,
    path = "/admin/sections/{id}",
    params(("id" = Uuid, Path, description = "Section id")),
    responses(
        (status = 200, description = "Section deleted", body = MutationOutcome),
        (status = 404, description = "Unknown section", body = AdminFailure)
    )
)]
#[instrument(skip(state))]
pub async fn delete_section_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AdminResult<Json<MutationOutcome>> {
    let outcome = state.admin().delete_section(parse_id(&id)?).await?;
    Ok(Json(outcome))
}
