//! services/api/src/web/browse.rs
//!
//! Read-only page data for the browse flow: semester, subject, category and
//! resource.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use study_catalog_core::catalog::{catalog_section, CatalogSection};
use study_catalog_core::domain::{Category, Resource, Subject};
use study_catalog_core::drive;
use study_catalog_core::listing::{CategoryListing, SubjectOverview};
use study_catalog_core::semesters::{self, SemesterInfo, Term};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{ErrorBody, JsonError, JsonResult};
use crate::web::state::AppState;

//=========================================================================================
// Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct SubjectEntry {
    pub code: String,
    pub title: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemesterSummary {
    pub sem_no: u8,
    pub year: u8,
    /// `odd` or `even`.
    pub term: String,
    pub total_marks: Option<u32>,
    pub subjects: Vec<SubjectEntry>,
}

impl From<&SemesterInfo> for SemesterSummary {
    fn from(info: &SemesterInfo) -> Self {
        Self {
            sem_no: info.sem_no,
            year: info.year,
            term: match info.term {
                Term::Odd => "odd".to_string(),
                Term::Even => "even".to_string(),
            },
            total_marks: info.total_marks,
            subjects: info
                .subjects
                .iter()
                .map(|s| SubjectEntry {
                    code: s.code.to_string(),
                    title: s.title.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SemesterPage {
    pub semester: SemesterSummary,
    /// Subjects stored for this semester, by name.
    pub subjects: Vec<Subject>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDetail {
    pub resource: Resource,
    /// Same-origin path that streams the document through the PDF proxy.
    pub viewer_url: String,
    pub embed_url: Option<String>,
    pub download_url: Option<String>,
    pub sections: Vec<CatalogSection>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// The static semester tables.
#[utoipa::path(
    get,
    path = "/api/semesters",
    responses((status = 200, description = "All semesters", body = Vec<SemesterSummary>))
)]
pub async fn list_semesters_handler() -> Json<Vec<SemesterSummary>> {
    Json(semesters::all().iter().map(SemesterSummary::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/semesters/{sem}",
    params(("sem" = u8, Path, description = "Semester number, 1-8")),
    responses(
        (status = 200, description = "The semester and its stored subjects", body = SemesterPage),
        (status = 404, description = "No such semester", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn semester_handler(
    State(state): State<Arc<AppState>>,
    Path(sem): Path<String>,
) -> JsonResult<Json<SemesterPage>> {
    let info = sem
        .parse::<u8>()
        .ok()
        .and_then(semesters::get)
        .ok_or_else(|| JsonError::not_found(format!("Semester {sem} not found")))?;
    let subjects = state.db.list_subjects_by_semester(info.sem_no).await?;
    Ok(Json(SemesterPage {
        semester: SemesterSummary::from(info),
        subjects,
    }))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{slug}",
    params(("slug" = String, Path, description = "Subject slug")),
    responses(
        (status = 200, description = "The subject and its enabled categories", body = SubjectOverview),
        (status = 404, description = "Unknown subject", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn subject_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> JsonResult<Json<SubjectOverview>> {
    let subject = state.db.get_subject_by_slug(&slug).await?;
    let resources = state.db.list_resources_by_subject(&subject.code).await?;
    Ok(Json(SubjectOverview::new(subject, &resources)))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{slug}/{category}",
    params(
        ("slug" = String, Path, description = "Subject slug"),
        ("category" = String, Path, description = "notes, pyqs, books, lab or exam")
    ),
    responses(
        (status = 200, description = "Resources of the category", body = CategoryListing),
        (status = 400, description = "Unknown category", body = ErrorBody),
        (status = 404, description = "Unknown subject or disabled category", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn category_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, category)): Path<(String, String)>,
) -> JsonResult<Json<CategoryListing>> {
    let category: Category = category
        .parse()
        .map_err(|e: study_catalog_core::DomainError| JsonError::bad_request(e.to_string()))?;
    let subject = state.db.get_subject_by_slug(&slug).await?;
    if !subject.enabled_categories.contains(category) {
        return Err(JsonError::not_found(format!(
            "{} is not available for {}",
            category.label(),
            subject.name
        )));
    }
    let resources = state
        .db
        .list_resources_by_category(&subject.code, category)
        .await?;
    Ok(Json(CategoryListing::new(subject, category, resources)))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource id")),
    responses(
        (status = 200, description = "The resource with its viewer links", body = ResourceDetail),
        (status = 404, description = "Unknown resource", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn resource_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> JsonResult<Json<ResourceDetail>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| JsonError::not_found(format!("Resource {id} not found")))?;
    let resource = state.db.get_resource(id).await?;
    let sections = state
        .db
        .list_sections_for_resource(id)
        .await?
        .iter()
        .map(|s| catalog_section(&state.config.cdn_base, &resource.subject_code, s))
        .collect();
    Ok(Json(ResourceDetail {
        viewer_url: drive::viewer_path(&resource.url),
        embed_url: drive::embed_url(&resource.url),
        download_url: drive::download_url(&resource.url),
        resource,
        sections,
    }))
}
