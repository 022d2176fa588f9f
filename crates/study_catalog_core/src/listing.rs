//! crates/study_catalog_core/src/listing.rs
//!
//! Page data for the browse flow: semester → subject → category → resource.

use serde::Serialize;

use crate::domain::{Category, Resource, Subject};

/// Shown in place of a resource list when a category has nothing yet.
pub const EMPTY_CATEGORY_MESSAGE: &str = "Resources for this category will be updated soon.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Category,
    pub label: String,
    pub resource_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubjectOverview {
    pub subject: Subject,
    pub categories: Vec<CategorySummary>,
}

impl SubjectOverview {
    /// One summary per enabled category; resources in disabled categories are
    /// not counted anywhere.
    pub fn new(subject: Subject, resources: &[Resource]) -> Self {
        let categories = subject
            .enabled_categories
            .iter()
            .map(|category| CategorySummary {
                category,
                label: category.label().to_string(),
                resource_count: resources.iter().filter(|r| r.category == category).count(),
            })
            .collect();
        Self { subject, categories }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub subject: Subject,
    pub category: Category,
    pub resources: Vec<Resource>,
    pub empty_state: Option<String>,
}

impl CategoryListing {
    pub fn new(subject: Subject, category: Category, resources: Vec<Resource>) -> Self {
        let empty_state = resources
            .is_empty()
            .then(|| EMPTY_CATEGORY_MESSAGE.to_string());
        Self {
            subject,
            category,
            resources,
            empty_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnabledCategories;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn subject(enabled: EnabledCategories) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            code: "ENEX_201".to_string(),
            slug: "microprocessors".to_string(),
            name: "Microprocessors".to_string(),
            semester: 3,
            enabled_categories: enabled,
            created_at: Utc::now(),
        }
    }

    fn resource(category: Category) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            subject_code: "ENEX_201".to_string(),
            title: "Manual v1".to_string(),
            url: "1hGxoY5h_qt-D5iRAmro-hVw2lqScZ1KZ".to_string(),
            category,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_category_shows_updated_soon_state() {
        let listing = CategoryListing::new(subject(EnabledCategories::all()), Category::Lab, vec![]);
        assert_eq!(listing.empty_state.as_deref(), Some(EMPTY_CATEGORY_MESSAGE));

        let listing = CategoryListing::new(
            subject(EnabledCategories::all()),
            Category::Books,
            vec![resource(Category::Books)],
        );
        assert_eq!(listing.empty_state, None);
    }

    #[test]
    fn overview_counts_only_enabled_categories() {
        let mut enabled = EnabledCategories::default();
        enabled.set(Category::Pyqs, true);
        enabled.set(Category::Books, true);
        let resources = vec![
            resource(Category::Books),
            resource(Category::Books),
            resource(Category::Notes),
        ];

        let overview = SubjectOverview::new(subject(enabled), &resources);

        let counts: Vec<(Category, usize)> = overview
            .categories
            .iter()
            .map(|c| (c.category, c.resource_count))
            .collect();
        assert_eq!(counts, vec![(Category::Pyqs, 0), (Category::Books, 2)]);
        assert_eq!(overview.categories[0].label, "PYQs");
    }
}
