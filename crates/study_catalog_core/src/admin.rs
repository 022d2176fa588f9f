//! crates/study_catalog_core/src/admin.rs
//!
//! Admin mutations of the catalog. Each one reports the browse paths it made
//! stale and refreshes the stored catalog checksum.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::catalog::{refresh_checksum, slugify};
use crate::domain::{
    EnabledCategories, NewResource, NewSection, NewSubject, ResourceUpdate, SubjectUpdate,
};
use crate::ports::{CatalogRepository, PortError, PortResult};
use crate::revalidate::{locate_resource, ResourceLocation, RevalidatedPaths};
use crate::semesters;

/// What an admin mutation reports back to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    /// The record that was created, changed or removed.
    pub id: Uuid,
    pub revalidated: Vec<String>,
    pub checksum: String,
}

pub struct CatalogAdmin<'a> {
    repo: &'a dyn CatalogRepository,
    cdn_base: &'a str,
}

impl<'a> CatalogAdmin<'a> {
    pub fn new(repo: &'a dyn CatalogRepository, cdn_base: &'a str) -> Self {
        Self { repo, cdn_base }
    }

    // --- Subjects ---

    pub async fn add_subject(&self, subject: NewSubject) -> PortResult<MutationOutcome> {
        let created = self.repo.create_subject(subject.normalized()?).await?;
        info!(code = %created.code, "Subject added");

        let mut paths = RevalidatedPaths::new();
        paths.semester(created.semester);
        self.finish("Subject added successfully.", created.id, paths).await
    }

    pub async fn update_subject(
        &self,
        id: Uuid,
        update: SubjectUpdate,
    ) -> PortResult<MutationOutcome> {
        let existing = self.repo.get_subject(id).await?;
        update.apply_to(&existing)?;
        let updated = self.repo.update_subject(id, update).await?;
        info!(code = %updated.code, "Subject updated");

        let mut paths = RevalidatedPaths::new();
        paths.subject(&existing);
        paths.subject(&updated);
        self.finish("Subject updated successfully.", updated.id, paths).await
    }

    pub async fn delete_subject(&self, id: Uuid) -> PortResult<MutationOutcome> {
        let deleted = self.repo.delete_subject(id).await?;
        info!(code = %deleted.code, "Subject deleted");

        let mut paths = RevalidatedPaths::new();
        paths.semester(deleted.semester);
        self.finish("Subject deleted successfully.", deleted.id, paths).await
    }

    /// Inserts every subject of the static semester tables that is not stored
    /// yet, with all categories enabled. Returns how many were created.
    pub async fn seed_static_subjects(&self) -> PortResult<usize> {
        let mut created = 0;
        for semester in semesters::all() {
            for info in semester.subjects {
                match self.repo.get_subject_by_code(info.code).await {
                    Ok(_) => continue,
                    Err(PortError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
                let subject = NewSubject {
                    code: info.code.to_string(),
                    slug: slugify(info.title),
                    name: info.title.to_string(),
                    semester: semester.sem_no,
                    enabled_categories: EnabledCategories::all(),
                };
                self.repo.create_subject(subject.normalized()?).await?;
                created += 1;
            }
        }
        if created > 0 {
            refresh_checksum(self.repo, self.cdn_base).await?;
        }
        info!(created, "Static subjects seeded");
        Ok(created)
    }

    // --- Resources ---

    pub async fn add_resource(&self, resource: NewResource) -> PortResult<MutationOutcome> {
        let resource = resource.normalized()?;
        let subject = self
            .repo
            .get_subject_by_code(&resource.subject_code)
            .await
            .map_err(|e| match e {
                PortError::NotFound(_) => {
                    PortError::Invalid(format!("Unknown subject code {}", resource.subject_code))
                }
                other => other,
            })?;
        let created = self.repo.create_resource(resource).await?;
        info!(id = %created.id, subject = %created.subject_code, "Resource added");

        let mut paths = RevalidatedPaths::new();
        paths.resource(&ResourceLocation {
            semester: Some(subject.semester),
            subject_slug: subject.slug,
            category: created.category,
        });
        self.finish("Resource added.", created.id, paths).await
    }

    pub async fn update_resource(
        &self,
        id: Uuid,
        update: ResourceUpdate,
    ) -> PortResult<MutationOutcome> {
        let existing = self.repo.get_resource(id).await?;
        update.apply_to(&existing)?;
        let before = locate_resource(self.repo, &existing).await;
        let updated = self.repo.update_resource(id, update).await?;
        let after = locate_resource(self.repo, &updated).await;
        info!(id = %updated.id, "Resource updated");

        let mut paths = RevalidatedPaths::new();
        paths.resource(&before);
        paths.resource(&after);
        self.finish("Resource updated successfully.", updated.id, paths).await
    }

    pub async fn delete_resource(&self, id: Uuid) -> PortResult<MutationOutcome> {
        let existing = self.repo.get_resource(id).await?;
        let location = locate_resource(self.repo, &existing).await;
        let deleted = self.repo.delete_resource(id).await?;
        info!(id = %deleted.id, "Resource deleted");

        let mut paths = RevalidatedPaths::new();
        paths.resource(&location);
        self.finish("Resource deleted successfully.", deleted.id, paths).await
    }

    // --- Sections ---

    pub async fn add_section(
        &self,
        resource_id: Uuid,
        section: NewSection,
    ) -> PortResult<MutationOutcome> {
        if section.title.trim().is_empty() {
            return Err(PortError::Invalid("Field 'title' must not be empty".to_string()));
        }
        let resource = self.repo.get_resource(resource_id).await?;
        let section = NewSection {
            title: section.title.trim().to_string(),
            position: section.position,
        };
        let created = self.repo.create_section(resource_id, section).await?;
        info!(id = %created.id, resource = %resource_id, "Section added");

        let location = locate_resource(self.repo, &resource).await;
        let mut paths = RevalidatedPaths::new();
        paths.section(&location, resource_id);
        self.finish("Section added.", created.id, paths).await
    }

    pub async fn delete_section(&self, id: Uuid) -> PortResult<MutationOutcome> {
        let deleted = self.repo.delete_section(id).await?;
        info!(id = %deleted.id, "Section deleted");

        let mut paths = RevalidatedPaths::new();
        if let Ok(resource) = self.repo.get_resource(deleted.resource_id).await {
            let location = locate_resource(self.repo, &resource).await;
            paths.section(&location, resource.id);
        }
        self.finish("Section deleted successfully.", deleted.id, paths).await
    }

    async fn finish(
        &self,
        message: &str,
        id: Uuid,
        paths: RevalidatedPaths,
    ) -> PortResult<MutationOutcome> {
        let checksum = refresh_checksum(self.repo, self.cdn_base).await?;
        Ok(MutationOutcome {
            success: true,
            message: message.to_string(),
            id,
            revalidated: paths.into_vec(),
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::memory::InMemoryRepository;
    use claims::{assert_err, assert_ok, assert_some};
    use pretty_assertions::assert_eq;

    const CDN: &str = "https://cdn.example";

    fn toc() -> NewSubject {
        NewSubject {
            code: "ENCT_203".to_string(),
            slug: "toc".to_string(),
            name: "Theory of Computation".to_string(),
            semester: 3,
            enabled_categories: EnabledCategories::all(),
        }
    }

    fn pyq() -> NewResource {
        NewResource {
            subject_code: "ENCT_203".to_string(),
            title: "81 Chaitra (R)".to_string(),
            url: "1KgMIpEp9qenH_dBggtk7IRhylwdHwM2B".to_string(),
            category: Category::Pyqs,
        }
    }

    #[tokio::test]
    async fn adding_a_subject_revalidates_its_semester() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);

        let outcome = assert_ok!(admin.add_subject(toc()).await);

        assert!(outcome.success);
        assert_eq!(outcome.revalidated, vec!["/admin/dashboard", "/3"]);
        assert_eq!(assert_some!(repo.stored_checksum().await.unwrap()), outcome.checksum);
    }

    #[tokio::test]
    async fn resource_mutations_revalidate_category_paths() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);
        assert_ok!(admin.add_subject(toc()).await);

        let added = assert_ok!(admin.add_resource(pyq()).await);
        assert_eq!(added.revalidated, vec!["/admin/dashboard", "/3/toc/pyqs"]);

        let update = ResourceUpdate {
            category: Some(Category::Books),
            ..Default::default()
        };
        let updated = assert_ok!(admin.update_resource(added.id, update).await);
        assert_eq!(
            updated.revalidated,
            vec!["/admin/dashboard", "/3/toc/pyqs", "/3/toc/books"]
        );
        assert_ne!(updated.checksum, added.checksum);

        let deleted = assert_ok!(admin.delete_resource(added.id).await);
        assert_eq!(deleted.revalidated, vec!["/admin/dashboard", "/3/toc/books"]);
        assert_err!(repo.get_resource(added.id).await);
    }

    #[tokio::test]
    async fn resources_need_a_known_subject() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);

        let err = assert_err!(admin.add_resource(pyq()).await);
        assert_eq!(err, PortError::Invalid("Unknown subject code ENCT_203".to_string()));
    }

    #[tokio::test]
    async fn renaming_a_subject_revalidates_old_and_new_paths() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);
        let added = assert_ok!(admin.add_subject(toc()).await);

        let update = SubjectUpdate {
            slug: Some("theory-of-computation".to_string()),
            semester: Some(4),
            ..Default::default()
        };
        let outcome = assert_ok!(admin.update_subject(added.id, update).await);

        assert_eq!(
            outcome.revalidated,
            vec![
                "/admin/dashboard",
                "/3",
                "/3/toc",
                "/4",
                "/4/theory-of-computation",
            ]
        );
    }

    #[tokio::test]
    async fn section_mutations_revalidate_the_resource_page() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);
        assert_ok!(admin.add_subject(toc()).await);
        let resource = assert_ok!(admin.add_resource(pyq()).await);

        let section = NewSection {
            title: "Solutions".to_string(),
            position: None,
        };
        let added = assert_ok!(admin.add_section(resource.id, section).await);
        let expected = format!("/3/toc/pyqs/{}", resource.id);
        assert_eq!(added.revalidated, vec!["/admin/dashboard".to_string(), expected.clone()]);

        let deleted = assert_ok!(admin.delete_section(added.id).await);
        assert_eq!(deleted.revalidated, vec!["/admin/dashboard".to_string(), expected]);
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let repo = InMemoryRepository::new();
        let admin = CatalogAdmin::new(&repo, CDN);

        let total: usize = semesters::all().iter().map(|s| s.subjects.len()).sum();
        assert_eq!(assert_ok!(admin.seed_static_subjects().await), total);
        assert_eq!(assert_ok!(admin.seed_static_subjects().await), 0);

        let subject = assert_ok!(repo.get_subject_by_code("ENCT_202").await);
        assert_eq!(subject.slug, "foundation-of-data-science");
        assert_eq!(subject.semester, 3);
    }
}
