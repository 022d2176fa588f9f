//! crates/study_catalog_core/src/catalog.rs
//!
//! Assembles the subject → resource → section tree served to clients and the
//! checksum they use to decide whether their cached copy is stale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Resource, Section, Subject};
use crate::ports::{CatalogRepository, PortError, PortResult};

/// Where section PDFs are published by default.
pub const DEFAULT_CDN_BASE: &str =
    "https://raw.githubusercontent.com/nabaraj-bhandari/academic-resources/main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CatalogResource {
    pub id: Uuid,
    pub subject_code: String,
    pub title: String,
    pub sections: Vec<CatalogSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CatalogSubject {
    pub code: String,
    pub resources: Vec<CatalogResource>,
}

/// Body of `GET /api/catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogPayload {
    pub checksum: String,
    pub data: Vec<CatalogSubject>,
}

/// Lowercases, drops everything outside `[a-z0-9]`, whitespace and `-`, and
/// joins whitespace runs with a single `-`.
pub fn slugify(input: &str) -> String {
    let kept: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

pub fn section_url(cdn_base: &str, subject_code: &str, resource_id: Uuid, title: &str) -> String {
    format!(
        "{}/resources/{}/{}/sections/{}.pdf",
        cdn_base.trim_end_matches('/'),
        subject_code,
        resource_id,
        slugify(title)
    )
}

pub fn catalog_section(cdn_base: &str, subject_code: &str, section: &Section) -> CatalogSection {
    CatalogSection {
        id: section.id,
        title: section.title.clone(),
        url: section_url(cdn_base, subject_code, section.resource_id, &section.title),
    }
}

/// Builds the tree: subjects ordered by code, resources by id, sections by
/// position then id. Every subject appears, with or without resources.
pub fn build_catalog(
    subjects: &[Subject],
    resources: &[Resource],
    sections: &[Section],
    cdn_base: &str,
) -> Vec<CatalogSubject> {
    let mut sections_by_resource: HashMap<Uuid, Vec<&Section>> = HashMap::new();
    for section in sections {
        sections_by_resource
            .entry(section.resource_id)
            .or_default()
            .push(section);
    }

    let mut resources_by_subject: HashMap<&str, Vec<&Resource>> = HashMap::new();
    for resource in resources {
        resources_by_subject
            .entry(resource.subject_code.as_str())
            .or_default()
            .push(resource);
    }

    let mut ordered_subjects: Vec<&Subject> = subjects.iter().collect();
    ordered_subjects.sort_by(|a, b| a.code.cmp(&b.code));

    ordered_subjects
        .into_iter()
        .map(|subject| {
            let mut subject_resources = resources_by_subject
                .remove(subject.code.as_str())
                .unwrap_or_default();
            subject_resources.sort_by_key(|r| r.id);

            let resources = subject_resources
                .into_iter()
                .map(|resource| {
                    let mut resource_sections = sections_by_resource
                        .remove(&resource.id)
                        .unwrap_or_default();
                    resource_sections.sort_by_key(|s| (s.position, s.id));
                    CatalogResource {
                        id: resource.id,
                        subject_code: resource.subject_code.clone(),
                        title: resource.title.clone(),
                        sections: resource_sections
                            .into_iter()
                            .map(|s| catalog_section(cdn_base, &resource.subject_code, s))
                            .collect(),
                    }
                })
                .collect();

            CatalogSubject {
                code: subject.code.clone(),
                resources,
            }
        })
        .collect()
}

/// Hex BLAKE3 digest of the compact JSON form. A change signal, nothing more.
pub fn checksum(catalog: &[CatalogSubject]) -> PortResult<String> {
    let encoded =
        serde_json::to_vec(catalog).map_err(|e| PortError::Unexpected(e.to_string()))?;
    Ok(blake3::hash(&encoded).to_hex().to_string())
}

/// Reads everything from the repository and builds the tree.
pub async fn load_catalog(
    repo: &dyn CatalogRepository,
    cdn_base: &str,
) -> PortResult<Vec<CatalogSubject>> {
    let subjects = repo.list_subjects().await?;
    let resources = repo.list_resources().await?;
    let sections = repo.list_sections().await?;
    Ok(build_catalog(&subjects, &resources, &sections, cdn_base))
}

/// Recomputes the checksum of the stored catalog and persists it.
pub async fn refresh_checksum(repo: &dyn CatalogRepository, cdn_base: &str) -> PortResult<String> {
    let catalog = load_catalog(repo, cdn_base).await?;
    let sum = checksum(&catalog)?;
    repo.store_checksum(&sum).await?;
    debug!(checksum = %sum, "Catalog checksum refreshed");
    Ok(sum)
}

/// The stored checksum, computing and storing one first if none exists yet.
pub async fn current_checksum(repo: &dyn CatalogRepository, cdn_base: &str) -> PortResult<String> {
    match repo.stored_checksum().await? {
        Some(sum) if !sum.is_empty() => Ok(sum),
        _ => refresh_checksum(repo, cdn_base).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, EnabledCategories};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn subject(code: &str) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            code: code.to_string(),
            slug: code.to_lowercase(),
            name: code.to_string(),
            semester: 3,
            enabled_categories: EnabledCategories::all(),
            created_at: Utc::now(),
        }
    }

    fn resource(id: u128, code: &str, title: &str) -> Resource {
        Resource {
            id: Uuid::from_u128(id),
            subject_code: code.to_string(),
            title: title.to_string(),
            url: "1x2utc2_iyW1LUppCOHE5216-rqFZxli3".to_string(),
            category: Category::Notes,
            created_at: Utc::now(),
        }
    }

    fn section(id: u128, resource_id: u128, title: &str, position: i32) -> Section {
        Section {
            id: Uuid::from_u128(id),
            resource_id: Uuid::from_u128(resource_id),
            title: title.to_string(),
            position,
        }
    }

    #[test]
    fn slugify_matches_url_rules() {
        assert_eq!(slugify("  Unit 1: Intro to TOC  "), "unit-1-intro-to-toc");
        assert_eq!(slugify("CG by Hearn and  Pauline Baker"), "cg-by-hearn-and-pauline-baker");
        assert_eq!(slugify("81 Chaitra (R)"), "81-chaitra-r");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn section_urls_point_at_the_cdn() {
        let id = Uuid::from_u128(7);
        assert_eq!(
            section_url("https://cdn.example/", "ENCT_202", id, "Unit 2"),
            format!("https://cdn.example/resources/ENCT_202/{id}/sections/unit-2.pdf")
        );
    }

    #[test]
    fn catalog_is_ordered_and_includes_empty_subjects() {
        let subjects = vec![subject("ENCT_203"), subject("ENCT_202")];
        let resources = vec![
            resource(2, "ENCT_202", "Unit 2"),
            resource(1, "ENCT_202", "Unit 1"),
        ];
        let sections = vec![
            section(11, 1, "Part B", 2),
            section(10, 1, "Part A", 1),
        ];

        let catalog = build_catalog(&subjects, &resources, &sections, "https://cdn");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].code, "ENCT_202");
        assert_eq!(catalog[1].code, "ENCT_203");
        assert!(catalog[1].resources.is_empty());

        let ids: Vec<Uuid> = catalog[0].resources.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);

        let titles: Vec<&str> = catalog[0].resources[0]
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Part A", "Part B"]);
        assert!(catalog[0].resources[0].sections[0].url.ends_with("/sections/part-a.pdf"));
    }

    #[test]
    fn checksum_tracks_content() {
        let subjects = vec![subject("ENCT_202")];
        let before = build_catalog(&subjects, &[], &[], "https://cdn");
        let after = build_catalog(
            &subjects,
            &[resource(1, "ENCT_202", "Unit 1")],
            &[],
            "https://cdn",
        );

        let first = checksum(&before).unwrap();
        assert_eq!(first, checksum(&before).unwrap());
        assert_eq!(first.len(), 64);
        assert_ne!(first, checksum(&after).unwrap());
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let payload = CatalogPayload {
            checksum: "abc".to_string(),
            data: build_catalog(
                &[subject("ENCT_202")],
                &[resource(1, "ENCT_202", "Unit 1")],
                &[],
                "https://cdn",
            ),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"][0]["resources"][0]["subjectCode"], "ENCT_202");
        assert_eq!(json["checksum"], "abc");
    }
}
