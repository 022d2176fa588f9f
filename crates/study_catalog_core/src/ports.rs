//! crates/study_catalog_core/src/ports.rs
//!
//! Defines the service contracts (traits) the catalog logic depends on.
//! Persistence and upstream document fetching sit behind these traits so the
//! core stays independent of Postgres and of any HTTP client.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

use crate::domain::{
    Category, DomainError, NewResource, NewSection, NewSubject, Resource, ResourceUpdate,
    Section, Subject, SubjectUpdate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Upstream responded with status {status}")]
    Upstream { status: u16 },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<DomainError> for PortError {
    fn from(err: DomainError) -> Self {
        PortError::Invalid(err.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence
//=========================================================================================

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // --- Subjects ---
    async fn list_subjects(&self) -> PortResult<Vec<Subject>>;

    async fn list_subjects_by_semester(&self, semester: u8) -> PortResult<Vec<Subject>>;

    async fn get_subject(&self, id: Uuid) -> PortResult<Subject>;

    async fn get_subject_by_slug(&self, slug: &str) -> PortResult<Subject>;

    async fn get_subject_by_code(&self, code: &str) -> PortResult<Subject>;

    async fn create_subject(&self, subject: NewSubject) -> PortResult<Subject>;

    async fn update_subject(&self, id: Uuid, update: SubjectUpdate) -> PortResult<Subject>;

    /// Deletes the subject together with its resources and returns what was removed.
    async fn delete_subject(&self, id: Uuid) -> PortResult<Subject>;

    // --- Resources ---
    /// All resources, newest first.
    async fn list_resources(&self) -> PortResult<Vec<Resource>>;

    /// Resources of one subject, newest first.
    async fn list_resources_by_subject(&self, subject_code: &str) -> PortResult<Vec<Resource>>;

    /// Resources of one subject and category, ordered by title.
    async fn list_resources_by_category(
        &self,
        subject_code: &str,
        category: Category,
    ) -> PortResult<Vec<Resource>>;

    async fn get_resource(&self, id: Uuid) -> PortResult<Resource>;

    async fn create_resource(&self, resource: NewResource) -> PortResult<Resource>;

    async fn update_resource(&self, id: Uuid, update: ResourceUpdate) -> PortResult<Resource>;

    async fn delete_resource(&self, id: Uuid) -> PortResult<Resource>;

    // --- Sections ---
    async fn list_sections(&self) -> PortResult<Vec<Section>>;

    /// Sections of one resource ordered by position.
    async fn list_sections_for_resource(&self, resource_id: Uuid) -> PortResult<Vec<Section>>;

    async fn create_section(&self, resource_id: Uuid, section: NewSection) -> PortResult<Section>;

    async fn delete_section(&self, id: Uuid) -> PortResult<Section>;

    // --- Catalog metadata ---
    async fn stored_checksum(&self) -> PortResult<Option<String>>;

    async fn store_checksum(&self, checksum: &str) -> PortResult<()>;

    // --- Admin sessions ---
    async fn create_admin_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Fails with `PortError::Unauthorized` for unknown or expired sessions.
    async fn validate_admin_session(&self, session_id: &str) -> PortResult<()>;

    async fn delete_admin_session(&self, session_id: &str) -> PortResult<()>;
}

//=========================================================================================
// Upstream documents
//=========================================================================================

pub type ByteStream = Pin<Box<dyn Stream<Item = PortResult<Bytes>> + Send>>;

/// A document body being streamed from an upstream host.
pub struct RemoteDocument {
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Starts fetching `url`. A non-2xx upstream answer is reported as
    /// `PortError::Upstream` carrying the upstream status.
    async fn fetch(&self, url: &str) -> PortResult<RemoteDocument>;
}
