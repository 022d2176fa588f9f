//! crates/study_catalog_core/src/memory.rs
//!
//! An in-memory `CatalogRepository` with the same constraints as the Postgres
//! schema (unique codes and slugs, cascading deletes). Used by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::domain::{
    Category, NewResource, NewSection, NewSubject, Resource, ResourceUpdate, Section, Subject,
    SubjectUpdate,
};
use crate::ports::{CatalogRepository, PortError, PortResult};

#[derive(Default)]
struct Tables {
    subjects: Vec<Subject>,
    resources: Vec<Resource>,
    sections: Vec<Section>,
    checksum: Option<String>,
    admin_sessions: HashMap<String, DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(what: &str, key: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{what} {key} not found"))
}

impl Tables {
    fn check_subject_unique(&self, subject: &Subject) -> PortResult<()> {
        let clash = self
            .subjects
            .iter()
            .filter(|s| s.id != subject.id)
            .any(|s| s.code == subject.code || s.slug == subject.slug);
        if clash {
            Err(PortError::Conflict(format!(
                "Subject with code {} or slug {} already exists",
                subject.code, subject.slug
            )))
        } else {
            Ok(())
        }
    }

    fn check_subject_code(&self, code: &str) -> PortResult<()> {
        if self.subjects.iter().any(|s| s.code == code) {
            Ok(())
        } else {
            Err(PortError::Invalid(format!("Unknown subject code {code}")))
        }
    }

    fn newest_first(mut resources: Vec<Resource>) -> Vec<Resource> {
        resources.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        resources
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn list_subjects(&self) -> PortResult<Vec<Subject>> {
        let mut subjects = self.tables().subjects.clone();
        subjects.sort_by(|a, b| (a.semester, &a.name).cmp(&(b.semester, &b.name)));
        Ok(subjects)
    }

    async fn list_subjects_by_semester(&self, semester: u8) -> PortResult<Vec<Subject>> {
        let subjects = self.list_subjects().await?;
        Ok(subjects.into_iter().filter(|s| s.semester == semester).collect())
    }

    async fn get_subject(&self, id: Uuid) -> PortResult<Subject> {
        self.tables()
            .subjects
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found("Subject", id))
    }

    async fn get_subject_by_slug(&self, slug: &str) -> PortResult<Subject> {
        self.tables()
            .subjects
            .iter()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| not_found("Subject", slug))
    }

    async fn get_subject_by_code(&self, code: &str) -> PortResult<Subject> {
        self.tables()
            .subjects
            .iter()
            .find(|s| s.code == code)
            .cloned()
            .ok_or_else(|| not_found("Subject", code))
    }

    async fn create_subject(&self, subject: NewSubject) -> PortResult<Subject> {
        let mut tables = self.tables();
        let subject = Subject {
            id: Uuid::new_v4(),
            code: subject.code,
            slug: subject.slug,
            name: subject.name,
            semester: subject.semester,
            enabled_categories: subject.enabled_categories,
            created_at: Utc::now(),
        };
        tables.check_subject_unique(&subject)?;
        tables.subjects.push(subject.clone());
        Ok(subject)
    }

    async fn update_subject(&self, id: Uuid, update: SubjectUpdate) -> PortResult<Subject> {
        let mut tables = self.tables();
        let index = tables
            .subjects
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("Subject", id))?;
        let current = tables.subjects[index].clone();
        let next = update.apply_to(&current)?;
        tables.check_subject_unique(&next)?;
        if next.code != current.code {
            for resource in tables
                .resources
                .iter_mut()
                .filter(|r| r.subject_code == current.code)
            {
                resource.subject_code = next.code.clone();
            }
        }
        tables.subjects[index] = next.clone();
        Ok(next)
    }

    async fn delete_subject(&self, id: Uuid) -> PortResult<Subject> {
        let mut tables = self.tables();
        let index = tables
            .subjects
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("Subject", id))?;
        let removed = tables.subjects.remove(index);
        let orphaned: Vec<Uuid> = tables
            .resources
            .iter()
            .filter(|r| r.subject_code == removed.code)
            .map(|r| r.id)
            .collect();
        tables.resources.retain(|r| r.subject_code != removed.code);
        tables.sections.retain(|s| !orphaned.contains(&s.resource_id));
        Ok(removed)
    }

    async fn list_resources(&self) -> PortResult<Vec<Resource>> {
        Ok(Tables::newest_first(self.tables().resources.clone()))
    }

    async fn list_resources_by_subject(&self, subject_code: &str) -> PortResult<Vec<Resource>> {
        let resources = self
            .tables()
            .resources
            .iter()
            .filter(|r| r.subject_code == subject_code)
            .cloned()
            .collect();
        Ok(Tables::newest_first(resources))
    }

    async fn list_resources_by_category(
        &self,
        subject_code: &str,
        category: Category,
    ) -> PortResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .tables()
            .resources
            .iter()
            .filter(|r| r.subject_code == subject_code && r.category == category)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(resources)
    }

    async fn get_resource(&self, id: Uuid) -> PortResult<Resource> {
        self.tables()
            .resources
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("Resource", id))
    }

    async fn create_resource(&self, resource: NewResource) -> PortResult<Resource> {
        let mut tables = self.tables();
        tables.check_subject_code(&resource.subject_code)?;
        let resource = Resource {
            id: Uuid::new_v4(),
            subject_code: resource.subject_code,
            title: resource.title,
            url: resource.url,
            category: resource.category,
            created_at: Utc::now(),
        };
        tables.resources.push(resource.clone());
        Ok(resource)
    }

    async fn update_resource(&self, id: Uuid, update: ResourceUpdate) -> PortResult<Resource> {
        let mut tables = self.tables();
        let index = tables
            .resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found("Resource", id))?;
        let next = update.apply_to(&tables.resources[index])?;
        tables.check_subject_code(&next.subject_code)?;
        tables.resources[index] = next.clone();
        Ok(next)
    }

    async fn delete_resource(&self, id: Uuid) -> PortResult<Resource> {
        let mut tables = self.tables();
        let index = tables
            .resources
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found("Resource", id))?;
        let removed = tables.resources.remove(index);
        tables.sections.retain(|s| s.resource_id != id);
        Ok(removed)
    }

    async fn list_sections(&self) -> PortResult<Vec<Section>> {
        Ok(self.tables().sections.clone())
    }

    async fn list_sections_for_resource(&self, resource_id: Uuid) -> PortResult<Vec<Section>> {
        let mut sections: Vec<Section> = self
            .tables()
            .sections
            .iter()
            .filter(|s| s.resource_id == resource_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| (s.position, s.id));
        Ok(sections)
    }

    async fn create_section(&self, resource_id: Uuid, section: NewSection) -> PortResult<Section> {
        let mut tables = self.tables();
        if !tables.resources.iter().any(|r| r.id == resource_id) {
            return Err(not_found("Resource", resource_id));
        }
        let position = section.position.unwrap_or_else(|| {
            tables
                .sections
                .iter()
                .filter(|s| s.resource_id == resource_id)
                .map(|s| s.position + 1)
                .max()
                .unwrap_or(0)
        });
        let section = Section {
            id: Uuid::new_v4(),
            resource_id,
            title: section.title,
            position,
        };
        tables.sections.push(section.clone());
        Ok(section)
    }

    async fn delete_section(&self, id: Uuid) -> PortResult<Section> {
        let mut tables = self.tables();
        let index = tables
            .sections
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("Section", id))?;
        Ok(tables.sections.remove(index))
    }

    async fn stored_checksum(&self) -> PortResult<Option<String>> {
        Ok(self.tables().checksum.clone())
    }

    async fn store_checksum(&self, checksum: &str) -> PortResult<()> {
        self.tables().checksum = Some(checksum.to_string());
        Ok(())
    }

    async fn create_admin_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables()
            .admin_sessions
            .insert(session_id.to_string(), expires_at);
        Ok(())
    }

    async fn validate_admin_session(&self, session_id: &str) -> PortResult<()> {
        match self.tables().admin_sessions.get(session_id) {
            Some(expires_at) if *expires_at > Utc::now() => Ok(()),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_admin_session(&self, session_id: &str) -> PortResult<()> {
        self.tables().admin_sessions.remove(session_id);
        Ok(())
    }
}
