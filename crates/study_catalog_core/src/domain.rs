//! crates/study_catalog_core/src/domain.rs
//!
//! Defines the core data structures of the catalog: subjects, the resources
//! filed under them and the named sections a resource can be split into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::catalog::slugify;

/// Semesters are numbered 1 through 8.
pub const SEMESTER_RANGE: std::ops::RangeInclusive<u8> = 1..=8;

/// Validation failures raised while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Semester {0} is out of range (expected 1-8)")]
    InvalidSemester(u8),
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),
}

//=========================================================================================
// Categories
//=========================================================================================

/// The fixed set of buckets a resource can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    Notes,
    Pyqs,
    Books,
    Lab,
    Exam,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Notes,
        Category::Pyqs,
        Category::Books,
        Category::Lab,
        Category::Exam,
    ];

    /// The lowercase name used in URLs and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Notes => "notes",
            Category::Pyqs => "pyqs",
            Category::Books => "books",
            Category::Lab => "lab",
            Category::Exam => "exam",
        }
    }

    /// Human readable heading.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Notes => "Notes",
            Category::Pyqs => "PYQs",
            Category::Books => "Books",
            Category::Lab => "Lab",
            Category::Exam => "Exam",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The categories a subject exposes to students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct EnabledCategories {
    pub notes: bool,
    pub pyqs: bool,
    pub books: bool,
    pub lab: bool,
    pub exam: bool,
}

impl EnabledCategories {
    pub fn all() -> Self {
        Self {
            notes: true,
            pyqs: true,
            books: true,
            lab: true,
            exam: true,
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::Notes => self.notes,
            Category::Pyqs => self.pyqs,
            Category::Books => self.books,
            Category::Lab => self.lab,
            Category::Exam => self.exam,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        let slot = match category {
            Category::Notes => &mut self.notes,
            Category::Pyqs => &mut self.pyqs,
            Category::Books => &mut self.books,
            Category::Lab => &mut self.lab,
            Category::Exam => &mut self.exam,
        };
        *slot = enabled;
    }

    /// Enabled categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Builds the set from stored category names.
    pub fn from_names<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut enabled = Self::default();
        for name in names {
            enabled.set(name.as_ref().parse()?, true);
        }
        Ok(enabled)
    }

    pub fn to_names(&self) -> Vec<String> {
        self.iter().map(|c| c.as_str().to_string()).collect()
    }
}

//=========================================================================================
// Records
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub code: String,
    pub slug: String,
    pub name: String,
    pub semester: u8,
    pub enabled_categories: EnabledCategories,
    pub created_at: DateTime<Utc>,
}

/// A single study document. `url` is a Google Drive link or a bare Drive file id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub subject_code: String,
    pub title: String,
    pub url: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub title: String,
    pub position: i32,
}

//=========================================================================================
// Admin payloads
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub code: String,
    /// Derived from `name` when left empty.
    #[serde(default)]
    pub slug: String,
    pub name: String,
    pub semester: u8,
    #[serde(default = "EnabledCategories::all")]
    pub enabled_categories: EnabledCategories,
}

impl NewSubject {
    /// Trims the text fields, fills in the slug and checks the semester.
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.code = non_empty(self.code, "code")?;
        self.name = non_empty(self.name, "name")?;
        self.slug = self.slug.trim().to_string();
        if self.slug.is_empty() {
            self.slug = slugify(&self.name);
        }
        if self.slug.is_empty() {
            return Err(DomainError::EmptyField("slug"));
        }
        check_semester(self.semester)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubjectUpdate {
    pub code: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub semester: Option<u8>,
    pub enabled_categories: Option<EnabledCategories>,
}

impl SubjectUpdate {
    /// Produces the subject as it will look once the update is stored.
    pub fn apply_to(&self, current: &Subject) -> Result<Subject, DomainError> {
        let mut next = current.clone();
        if let Some(code) = &self.code {
            next.code = non_empty(code.clone(), "code")?;
        }
        if let Some(name) = &self.name {
            next.name = non_empty(name.clone(), "name")?;
        }
        if let Some(slug) = &self.slug {
            next.slug = non_empty(slug.clone(), "slug")?;
        }
        if let Some(semester) = self.semester {
            next.semester = check_semester(semester)?;
        }
        if let Some(enabled) = self.enabled_categories {
            next.enabled_categories = enabled;
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub subject_code: String,
    pub title: String,
    pub url: String,
    pub category: Category,
}

impl NewResource {
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.subject_code = non_empty(self.subject_code, "subjectCode")?;
        self.title = non_empty(self.title, "title")?;
        self.url = non_empty(self.url, "url")?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResourceUpdate {
    pub subject_code: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<Category>,
}

impl ResourceUpdate {
    pub fn apply_to(&self, current: &Resource) -> Result<Resource, DomainError> {
        let mut next = current.clone();
        if let Some(code) = &self.subject_code {
            next.subject_code = non_empty(code.clone(), "subjectCode")?;
        }
        if let Some(title) = &self.title {
            next.title = non_empty(title.clone(), "title")?;
        }
        if let Some(url) = &self.url {
            next.url = non_empty(url.clone(), "url")?;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub title: String,
    /// Appended after the existing sections when omitted.
    pub position: Option<i32>,
}

fn non_empty(value: String, field: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn check_semester(semester: u8) -> Result<u8, DomainError> {
    if SEMESTER_RANGE.contains(&semester) {
        Ok(semester)
    } else {
        Err(DomainError::InvalidSemester(semester))
    }
}
