//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogRepository` port from the core crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use study_catalog_core::domain::{
    Category, EnabledCategories, NewResource, NewSection, NewSubject, Resource, ResourceUpdate,
    Section, Subject, SubjectUpdate,
};
use study_catalog_core::ports::{CatalogRepository, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CatalogRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Translates `sqlx` failures into port errors, using the Postgres error codes
/// for constraint violations.
fn map_db_error(e: sqlx::Error, what: &str) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{what} not found")),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => PortError::Conflict(format!("{what} already exists")),
            Some("23503") => PortError::Invalid(format!("{what} references a missing record")),
            Some("23514") => PortError::Invalid(db.message().to_string()),
            _ => PortError::Unexpected(e.to_string()),
        },
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SubjectRecord {
    id: Uuid,
    code: String,
    slug: String,
    name: String,
    semester: i16,
    enabled_categories: Vec<String>,
    created_at: DateTime<Utc>,
}
impl SubjectRecord {
    fn to_domain(self) -> PortResult<Subject> {
        let semester = u8::try_from(self.semester)
            .map_err(|_| PortError::Unexpected(format!("Stored semester {} is invalid", self.semester)))?;
        Ok(Subject {
            id: self.id,
            code: self.code,
            slug: self.slug,
            name: self.name,
            semester,
            enabled_categories: EnabledCategories::from_names(&self.enabled_categories)
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ResourceRecord {
    id: Uuid,
    subject_code: String,
    title: String,
    url: String,
    category: String,
    created_at: DateTime<Utc>,
}
impl ResourceRecord {
    fn to_domain(self) -> PortResult<Resource> {
        Ok(Resource {
            id: self.id,
            subject_code: self.subject_code,
            title: self.title,
            url: self.url,
            category: self
                .category
                .parse()
                .map_err(|e: study_catalog_core::DomainError| PortError::Unexpected(e.to_string()))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SectionRecord {
    id: Uuid,
    resource_id: Uuid,
    title: String,
    position: i32,
}
impl SectionRecord {
    fn to_domain(self) -> Section {
        Section {
            id: self.id,
            resource_id: self.resource_id,
            title: self.title,
            position: self.position,
        }
    }
}

fn subjects_to_domain(records: Vec<SubjectRecord>) -> PortResult<Vec<Subject>> {
    records.into_iter().map(SubjectRecord::to_domain).collect()
}

fn resources_to_domain(records: Vec<ResourceRecord>) -> PortResult<Vec<Resource>> {
    records.into_iter().map(ResourceRecord::to_domain).collect()
}

//=========================================================================================
// `CatalogRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogRepository for DbAdapter {
    async fn list_subjects(&self) -> PortResult<Vec<Subject>> {
        let records = sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, code, slug, name, semester, enabled_categories, created_at \
             FROM subjects ORDER BY semester ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Subject"))?;
        subjects_to_domain(records)
    }

    async fn list_subjects_by_semester(&self, semester: u8) -> PortResult<Vec<Subject>> {
        let records = sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, code, slug, name, semester, enabled_categories, created_at \
             FROM subjects WHERE semester = $1 ORDER BY name ASC",
        )
        .bind(i16::from(semester))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Subject"))?;
        subjects_to_domain(records)
    }

    async fn get_subject(&self, id: Uuid) -> PortResult<Subject> {
        sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, code, slug, name, semester, enabled_categories, created_at \
             FROM subjects WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {id}")))?
        .to_domain()
    }

    async fn get_subject_by_slug(&self, slug: &str) -> PortResult<Subject> {
        sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, code, slug, name, semester, enabled_categories, created_at \
             FROM subjects WHERE slug = $1",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {slug}")))?
        .to_domain()
    }

    async fn get_subject_by_code(&self, code: &str) -> PortResult<Subject> {
        sqlx::query_as::<_, SubjectRecord>(
            "SELECT id, code, slug, name, semester, enabled_categories, created_at \
             FROM subjects WHERE code = $1",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {code}")))?
        .to_domain()
    }

    async fn create_subject(&self, subject: NewSubject) -> PortResult<Subject> {
        sqlx::query_as::<_, SubjectRecord>(
            "INSERT INTO subjects (id, code, slug, name, semester, enabled_categories) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, code, slug, name, semester, enabled_categories, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&subject.code)
        .bind(&subject.slug)
        .bind(&subject.name)
        .bind(i16::from(subject.semester))
        .bind(subject.enabled_categories.to_names())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {}", subject.code)))?
        .to_domain()
    }

    async fn update_subject(&self, id: Uuid, update: SubjectUpdate) -> PortResult<Subject> {
        let current = self.get_subject(id).await?;
        let next = update.apply_to(&current)?;
        sqlx::query_as::<_, SubjectRecord>(
            "UPDATE subjects SET code = $2, slug = $3, name = $4, semester = $5, \
             enabled_categories = $6 WHERE id = $1 \
             RETURNING id, code, slug, name, semester, enabled_categories, created_at",
        )
        .bind(id)
        .bind(&next.code)
        .bind(&next.slug)
        .bind(&next.name)
        .bind(i16::from(next.semester))
        .bind(next.enabled_categories.to_names())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {}", next.code)))?
        .to_domain()
    }

    async fn delete_subject(&self, id: Uuid) -> PortResult<Subject> {
        sqlx::query_as::<_, SubjectRecord>(
            "DELETE FROM subjects WHERE id = $1 \
             RETURNING id, code, slug, name, semester, enabled_categories, created_at",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Subject {id}")))?
        .to_domain()
    }

    async fn list_resources(&self) -> PortResult<Vec<Resource>> {
        let records = sqlx::query_as::<_, ResourceRecord>(
            "SELECT id, subject_code, title, url, category, created_at \
             FROM resources ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Resource"))?;
        resources_to_domain(records)
    }

    async fn list_resources_by_subject(&self, subject_code: &str) -> PortResult<Vec<Resource>> {
        let records = sqlx::query_as::<_, ResourceRecord>(
            "SELECT id, subject_code, title, url, category, created_at \
             FROM resources WHERE subject_code = $1 ORDER BY created_at DESC",
        )
        .bind(subject_code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Resource"))?;
        resources_to_domain(records)
    }

    async fn list_resources_by_category(
        &self,
        subject_code: &str,
        category: Category,
    ) -> PortResult<Vec<Resource>> {
        let records = sqlx::query_as::<_, ResourceRecord>(
            "SELECT id, subject_code, title, url, category, created_at \
             FROM resources WHERE subject_code = $1 AND category = $2 ORDER BY title ASC",
        )
        .bind(subject_code)
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Resource"))?;
        resources_to_domain(records)
    }

    async fn get_resource(&self, id: Uuid) -> PortResult<Resource> {
        sqlx::query_as::<_, ResourceRecord>(
            "SELECT id, subject_code, title, url, category, created_at \
             FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Resource {id}")))?
        .to_domain()
    }

    async fn create_resource(&self, resource: NewResource) -> PortResult<Resource> {
        sqlx::query_as::<_, ResourceRecord>(
            "INSERT INTO resources (id, subject_code, title, url, category) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, subject_code, title, url, category, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&resource.subject_code)
        .bind(&resource.title)
        .bind(&resource.url)
        .bind(resource.category.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Resource"))?
        .to_domain()
    }

    async fn update_resource(&self, id: Uuid, update: ResourceUpdate) -> PortResult<Resource> {
        let current = self.get_resource(id).await?;
        let next = update.apply_to(&current)?;
        sqlx::query_as::<_, ResourceRecord>(
            "UPDATE resources SET subject_code = $2, title = $3, url = $4, category = $5 \
             WHERE id = $1 \
             RETURNING id, subject_code, title, url, category, created_at",
        )
        .bind(id)
        .bind(&next.subject_code)
        .bind(&next.title)
        .bind(&next.url)
        .bind(next.category.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Resource {id}")))?
        .to_domain()
    }

    async fn delete_resource(&self, id: Uuid) -> PortResult<Resource> {
        sqlx::query_as::<_, ResourceRecord>(
            "DELETE FROM resources WHERE id = $1 \
             RETURNING id, subject_code, title, url, category, created_at",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Resource {id}")))?
        .to_domain()
    }

    async fn list_sections(&self) -> PortResult<Vec<Section>> {
        let records = sqlx::query_as::<_, SectionRecord>(
            "SELECT id, resource_id, title, position FROM sections ORDER BY position ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Section"))?;
        Ok(records.into_iter().map(SectionRecord::to_domain).collect())
    }

    async fn list_sections_for_resource(&self, resource_id: Uuid) -> PortResult<Vec<Section>> {
        let records = sqlx::query_as::<_, SectionRecord>(
            "SELECT id, resource_id, title, position FROM sections \
             WHERE resource_id = $1 ORDER BY position ASC, id ASC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Section"))?;
        Ok(records.into_iter().map(SectionRecord::to_domain).collect())
    }

    async fn create_section(&self, resource_id: Uuid, section: NewSection) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "INSERT INTO sections (id, resource_id, title, position) \
             VALUES ($1, $2, $3, COALESCE($4, \
                (SELECT COALESCE(MAX(position) + 1, 0) FROM sections WHERE resource_id = $2))) \
             RETURNING id, resource_id, title, position",
        )
        .bind(Uuid::new_v4())
        .bind(resource_id)
        .bind(&section.title)
        .bind(section.position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e, "Section") {
            PortError::Invalid(_) => PortError::NotFound(format!("Resource {resource_id} not found")),
            other => other,
        })?;
        Ok(record.to_domain())
    }

    async fn delete_section(&self, id: Uuid) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "DELETE FROM sections WHERE id = $1 RETURNING id, resource_id, title, position",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Section {id}")))?;
        Ok(record.to_domain())
    }

    async fn stored_checksum(&self) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT checksum FROM catalog_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Catalog checksum"))
    }

    async fn store_checksum(&self, checksum: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO catalog_meta (id, checksum) VALUES (1, $1) \
             ON CONFLICT (id) DO UPDATE SET checksum = EXCLUDED.checksum, updated_at = NOW()",
        )
        .bind(checksum)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Catalog checksum"))?;
        Ok(())
    }

    async fn create_admin_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO admin_sessions (id, expires_at) VALUES ($1, $2)")
            .bind(session_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Admin session"))?;
        Ok(())
    }

    async fn validate_admin_session(&self, session_id: &str) -> PortResult<()> {
        let found = sqlx::query_scalar::<_, String>(
            "SELECT id FROM admin_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Admin session"))?;
        found.map(|_| ()).ok_or(PortError::Unauthorized)
    }

    async fn delete_admin_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE id = $1 OR expires_at <= NOW()")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Admin session"))?;
        Ok(())
    }
}
