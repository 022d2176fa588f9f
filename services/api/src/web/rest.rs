//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use study_catalog_core::admin::MutationOutcome;
use study_catalog_core::catalog::{CatalogPayload, CatalogResource, CatalogSection, CatalogSubject};
use study_catalog_core::domain::{
    Category, EnabledCategories, NewResource, NewSection, NewSubject, Resource, ResourceUpdate,
    Section, Subject, SubjectUpdate,
};
use study_catalog_core::listing::{CategoryListing, CategorySummary, SubjectOverview};
use utoipa::OpenApi;

use crate::web::{admin, auth, browse, catalog, error, lookup, pdf};

#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::catalog_handler,
        catalog::checksum_handler,
        pdf::pdf_proxy_handler,
        pdf::pdf_handler,
        lookup::resource_sections_handler,
        lookup::subject_resources_handler,
        browse::list_semesters_handler,
        browse::semester_handler,
        browse::subject_handler,
        browse::category_handler,
        browse::resource_handler,
        auth::login_handler,
        auth::logout_handler,
        admin::list_subjects_handler,
        admin::create_subject_handler,
        admin::update_subject_handler,
        admin::delete_subject_handler,
        admin::list_resources_handler,
        admin::create_resource_handler,
        admin::update_resource_handler,
        admin::delete_resource_handler,
        admin::list_sections_handler,
        admin::create_section_handler,
        admin::delete_section_handler,
    ),
    components(
        schemas(
            CatalogPayload, CatalogSubject, CatalogResource, CatalogSection,
            catalog::ChecksumResponse, lookup::ResourceSummary,
            browse::SemesterSummary, browse::SubjectEntry, browse::SemesterPage, browse::ResourceDetail,
            SubjectOverview, CategorySummary, CategoryListing,
            Subject, Resource, Section, Category, EnabledCategories,
            NewSubject, SubjectUpdate, NewResource, ResourceUpdate, NewSection,
            MutationOutcome, auth::LoginRequest, auth::LoginResponse,
            error::ErrorBody, error::AdminFailure,
        )
    ),
    tags(
        (name = "Study Catalog API", description = "Browse, catalog sync and admin endpoints for the study resource catalog.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_public_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/catalog",
            "/api/catalog/checksum",
            "/api/pdf-proxy",
            "/api/subjects/{slug}/{category}",
            "/admin/resources/{id}/sections",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is missing");
        }
    }
}
