//! crates/study_catalog_core/src/revalidate.rs
//!
//! Works out which browse paths go stale when an admin changes the catalog.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Category, Resource, Subject};
use crate::ports::CatalogRepository;
use crate::semesters;

pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Ordered, de-duplicated list of paths. Always starts with the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevalidatedPaths(Vec<String>);

impl Default for RevalidatedPaths {
    fn default() -> Self {
        Self(vec![DASHBOARD_PATH.to_string()])
    }
}

impl RevalidatedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: String) {
        if !self.0.contains(&path) {
            self.0.push(path);
        }
    }

    pub fn subject(&mut self, subject: &Subject) {
        self.push(semester_path(subject.semester));
        self.push(subject_path(subject.semester, &subject.slug));
    }

    pub fn semester(&mut self, semester: u8) {
        self.push(semester_path(semester));
    }

    pub fn resource(&mut self, location: &ResourceLocation) {
        self.push(location.category_path());
    }

    pub fn section(&mut self, location: &ResourceLocation, resource_id: Uuid) {
        self.push(format!("{}/{}", location.category_path(), resource_id));
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

pub fn semester_path(semester: u8) -> String {
    format!("/{semester}")
}

pub fn subject_path(semester: u8, slug: &str) -> String {
    format!("/{semester}/{slug}")
}

/// Where a resource is listed in the browse flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    pub semester: Option<u8>,
    pub subject_slug: String,
    pub category: Category,
}

impl ResourceLocation {
    pub fn category_path(&self) -> String {
        match self.semester {
            Some(semester) => format!("/{}/{}/{}", semester, self.subject_slug, self.category),
            None => format!("/{}/{}", self.subject_slug, self.category),
        }
    }
}

/// Resolves the subject behind a resource. When the lookup fails the subject
/// code stands in for the slug and the semester comes from the static tables.
pub async fn locate_resource(repo: &dyn CatalogRepository, resource: &Resource) -> ResourceLocation {
    match repo.get_subject_by_code(&resource.subject_code).await {
        Ok(subject) => ResourceLocation {
            semester: Some(subject.semester),
            subject_slug: subject.slug,
            category: resource.category,
        },
        Err(e) => {
            warn!(
                subject_code = %resource.subject_code,
                "Revalidate path fallback (subject lookup failed): {}", e
            );
            ResourceLocation {
                semester: semesters::find_subject(&resource.subject_code).map(|(s, _)| s.sem_no),
                subject_slug: resource.subject_code.clone(),
                category: resource.category,
            }
        }
    }
}
