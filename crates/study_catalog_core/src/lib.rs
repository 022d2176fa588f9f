pub mod admin;
pub mod catalog;
pub mod domain;
pub mod drive;
pub mod freshness;
pub mod listing;
pub mod pdf_cache;
pub mod ports;
pub mod revalidate;
pub mod semesters;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use admin::{CatalogAdmin, MutationOutcome};
pub use catalog::{CatalogPayload, CatalogResource, CatalogSection, CatalogSubject};
pub use domain::{
    Category, DomainError, EnabledCategories, NewResource, NewSection, NewSubject, Resource,
    ResourceUpdate, Section, Subject, SubjectUpdate,
};
pub use ports::{
    CatalogRepository, DocumentFetcher, PortError, PortResult, RemoteDocument,
};
