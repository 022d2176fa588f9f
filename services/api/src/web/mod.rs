pub mod admin;
pub mod auth;
pub mod browse;
pub mod catalog;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod pdf;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::require_admin;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the complete application: public routes, the session-gated admin
/// routes and the Swagger UI.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/catalog", get(catalog::catalog_handler))
        .route("/api/catalog/checksum", get(catalog::checksum_handler))
        .route("/api/pdf-proxy", get(pdf::pdf_proxy_handler))
        .route("/api/pdf", get(pdf::pdf_handler))
        .route("/api/resource", get(lookup::resource_sections_handler))
        .route("/api/subject", get(lookup::subject_resources_handler))
        .route("/api/semesters", get(browse::list_semesters_handler))
        .route("/api/semesters/{sem}", get(browse::semester_handler))
        .route("/api/subjects/{slug}", get(browse::subject_handler))
        .route("/api/subjects/{slug}/{category}", get(browse::category_handler))
        .route("/api/resources/{id}", get(browse::resource_handler))
        .route("/admin/login", post(auth::login_handler))
        .route("/admin/logout", post(auth::logout_handler));

    // Admin routes (session required)
    let admin_routes = Router::new()
        .route(
            "/admin/subjects",
            get(admin::list_subjects_handler).post(admin::create_subject_handler),
        )
        .route(
            "/admin/subjects/{id}",
            put(admin::update_subject_handler).delete(admin::delete_subject_handler),
        )
        .route(
            "/admin/resources",
            get(admin::list_resources_handler).post(admin::create_resource_handler),
        )
        .route(
            "/admin/resources/{id}",
            put(admin::update_resource_handler).delete(admin::delete_resource_handler),
        )
        .route(
            "/admin/resources/{id}/sections",
            get(admin::list_sections_handler).post(admin::create_section_handler),
        )
        .route("/admin/sections/{id}", delete(admin::delete_section_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
