//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, ReqwestFetcher},
    config::Config,
    error::ApiError,
    web::{self, AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_catalog_core::{admin::CatalogAdmin, catalog};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    if config.seed_subjects {
        let created = CatalogAdmin::new(db_adapter.as_ref(), &config.cdn_base)
            .seed_static_subjects()
            .await?;
        info!("Seeded {} subjects from the semester tables.", created);
    }

    // Section URLs depend on CDN_BASE, so the stored checksum is recomputed
    // against this configuration before any client asks for it.
    let checksum = catalog::refresh_checksum(db_adapter.as_ref(), &config.cdn_base).await?;
    info!("Catalog checksum is {}.", checksum);

    // --- 3. Initialize the Upstream Fetcher ---
    let fetcher = Arc::new(ReqwestFetcher::new(config.upstream_timeout)?);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        fetcher,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = web::router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
