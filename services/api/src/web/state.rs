//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_catalog_core::admin::CatalogAdmin;
use study_catalog_core::ports::{CatalogRepository, DocumentFetcher};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn CatalogRepository>,
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Admin mutations against the shared repository.
    pub fn admin(&self) -> CatalogAdmin<'_> {
        CatalogAdmin::new(self.db.as_ref(), &self.config.cdn_base)
    }
}
