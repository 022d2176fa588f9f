mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use claims::assert_some;
use common::{spawn_app, StubFetcher, CDN_BASE};
use pretty_assertions::assert_eq;
use serde_json::json;
use study_catalog_core::domain::{
    Category, EnabledCategories, NewResource, NewSection, NewSubject, Resource, Subject,
};
use study_catalog_core::ports::CatalogRepository;
use study_catalog_core::listing::EMPTY_CATEGORY_MESSAGE;

const DRIVE_FILE: &str = "https://drive.google.com/uc?export=download&id=1iniNDqBv0dJSNVcyEFcf";

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

async fn seed_subject(repo: &dyn CatalogRepository, enabled: EnabledCategories) -> Subject {
    repo.create_subject(NewSubject {
        code: "ENCT_252".to_string(),
        slug: "theory-of-computation".to_string(),
        name: "Theory of Computation".to_string(),
        semester: 4,
        enabled_categories: enabled,
    })
    .await
    .unwrap()
}

async fn seed_resource(repo: &dyn CatalogRepository, category: Category) -> Resource {
    repo.create_resource(NewResource {
        subject_code: "ENCT_252".to_string(),
        title: "Automata Notes".to_string(),
        url: "https://drive.google.com/file/d/1iniNDqBv0dJSNVcyEFcf/view?usp=sharing".to_string(),
        category,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn catalog_nests_sections_with_cdn_urls_and_matches_the_checksum() {
    let app = spawn_app(StubFetcher::default());
    seed_subject(app.repo.as_ref(), EnabledCategories::all()).await;
    let resource = seed_resource(app.repo.as_ref(), Category::Notes).await;
    let section = app
        .repo
        .create_section(
            resource.id,
            NewSection {
                title: "Unit 1 Intro".to_string(),
                position: None,
            },
        )
        .await
        .unwrap();

    let (status, catalog) = app.get_json("/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        catalog["data"],
        json!([{
            "code": "ENCT_252",
            "resources": [{
                "id": resource.id,
                "subjectCode": "ENCT_252",
                "title": "Automata Notes",
                "sections": [{
                    "id": section.id,
                    "title": "Unit 1 Intro",
                    "url": format!("{CDN_BASE}/resources/ENCT_252/{}/sections/unit-1-intro.pdf", resource.id),
                }],
            }],
        }])
    );

    let (status, checksum) = app.get_json("/api/catalog/checksum").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checksum["checksum"], catalog["checksum"]);
}

#[tokio::test]
async fn catalog_and_checksum_agree_after_the_stored_value_goes_stale() {
    let app = spawn_app(StubFetcher::default());
    seed_subject(app.repo.as_ref(), EnabledCategories::all()).await;
    seed_resource(app.repo.as_ref(), Category::Notes).await;
    app.repo.store_checksum("stale").await.unwrap();

    let (status, catalog) = app.get_json("/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    let (status, checksum) = app.get_json("/api/catalog/checksum").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(catalog["checksum"], checksum["checksum"]);
    assert_eq!(catalog["checksum"], "stale");
    assert_eq!(catalog["data"][0]["resources"][0]["title"], "Automata Notes");
}

#[tokio::test]
async fn pdf_proxy_rejects_hosts_outside_the_allow_list() {
    let app = spawn_app(StubFetcher::default());

    let uri = format!("/api/pdf-proxy?file={}", encode("https://example.com/notes.pdf"));
    let (status, body) = app.get_json(&uri).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Only Google Drive URLs are allowed" }));
    assert!(app.fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pdf_proxy_requires_a_valid_file_parameter() {
    let app = spawn_app(StubFetcher::default());

    let (status, body) = app.get_json("/api/pdf-proxy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing file parameter" }));

    let (status, body) = app.get_json("/api/pdf-proxy?file=not-a-url").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid URL" }));
}

#[tokio::test]
async fn pdf_proxy_streams_drive_documents_as_pdf() {
    let app = spawn_app(StubFetcher::default().serving(DRIVE_FILE, b"%PDF-1.7 body"));

    let request = Request::get(format!("/api/pdf-proxy?file={}", encode(DRIVE_FILE)))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=0, s-maxage=0, must-revalidate"
    );
    assert_eq!(&body[..], b"%PDF-1.7 body");
}

#[tokio::test]
async fn pdf_proxy_passes_upstream_error_statuses_through() {
    let app = spawn_app(StubFetcher::default().failing(DRIVE_FILE, 404));

    let uri = format!("/api/pdf-proxy?file={}", encode(DRIVE_FILE));
    let (status, body) = app.get_json(&uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Upstream error 404" }));
}

#[tokio::test]
async fn pdf_endpoint_marks_documents_immutable_and_hides_failures() {
    let app = spawn_app(
        StubFetcher::default()
            .serving("https://cdn.test/a.pdf", b"%PDF")
            .failing("https://cdn.test/gone.pdf", 404),
    );

    let request = Request::get(format!("/api/pdf?url={}", encode("https://cdn.test/a.pdf")))
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=31536000, immutable");
    assert_eq!(&body[..], b"%PDF");

    let (status, body) = app
        .get_json(&format!("/api/pdf?url={}", encode("https://cdn.test/gone.pdf")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch PDF" }));

    let (status, _) = app.get_json("/api/pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resource_lookup_validates_the_id() {
    let app = spawn_app(StubFetcher::default());

    let (status, _) = app.get_json("/api/resource").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get_json("/api/resource?id=clx0123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get_json(&format!("/api/resource?id={}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn subject_lookup_lists_resource_titles() {
    let app = spawn_app(StubFetcher::default());
    seed_subject(app.repo.as_ref(), EnabledCategories::all()).await;
    let resource = seed_resource(app.repo.as_ref(), Category::Books).await;

    let (status, body) = app.get_json("/api/subject?code=ENCT_252").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": resource.id, "title": "Automata Notes" }]));

    let (status, body) = app.get_json("/api/subject").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Code is required" }));
}

#[tokio::test]
async fn empty_category_shows_the_placeholder_message() {
    let app = spawn_app(StubFetcher::default());
    let mut enabled = EnabledCategories::default();
    enabled.set(Category::Notes, true);
    enabled.set(Category::Pyqs, true);
    seed_subject(app.repo.as_ref(), enabled).await;
    seed_resource(app.repo.as_ref(), Category::Notes).await;

    let (status, body) = app.get_json("/api/subjects/theory-of-computation/pyqs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"], json!([]));
    assert_eq!(body["emptyState"], json!(EMPTY_CATEGORY_MESSAGE));

    let (status, body) = app.get_json("/api/subjects/theory-of-computation/NOTES").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"][0]["title"], "Automata Notes");
    assert_eq!(body["emptyState"], serde_json::Value::Null);

    let (status, _) = app.get_json("/api/subjects/theory-of-computation/lab").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get_json("/api/subjects/theory-of-computation/slides").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get_json("/api/subjects/unknown/notes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subject_overview_counts_enabled_categories_only() {
    let app = spawn_app(StubFetcher::default());
    let mut enabled = EnabledCategories::default();
    enabled.set(Category::Notes, true);
    seed_subject(app.repo.as_ref(), enabled).await;
    seed_resource(app.repo.as_ref(), Category::Notes).await;
    seed_resource(app.repo.as_ref(), Category::Lab).await;

    let (status, body) = app.get_json("/api/subjects/theory-of-computation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        json!([{ "category": "notes", "label": "Notes", "resourceCount": 1 }])
    );
}

#[tokio::test]
async fn semesters_outside_one_to_eight_are_not_found() {
    let app = spawn_app(StubFetcher::default());
    seed_subject(app.repo.as_ref(), EnabledCategories::all()).await;

    let (status, body) = app.get_json("/api/semesters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(8));

    let (status, body) = app.get_json("/api/semesters/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["semester"]["semNo"], 4);
    assert_eq!(body["subjects"][0]["code"], "ENCT_252");

    for sem in ["0", "9", "four"] {
        let (status, _) = app.get_json(&format!("/api/semesters/{sem}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "semester {sem}");
    }
}

#[tokio::test]
async fn resource_detail_links_the_viewer_through_the_proxy() {
    let app = spawn_app(StubFetcher::default());
    seed_subject(app.repo.as_ref(), EnabledCategories::all()).await;
    let resource = seed_resource(app.repo.as_ref(), Category::Notes).await;

    let (status, body) = app.get_json(&format!("/api/resources/{}", resource.id)).await;
    assert_eq!(status, StatusCode::OK);
    let viewer = assert_some!(body["viewerUrl"].as_str());
    assert_eq!(
        viewer,
        format!("/api/pdf-proxy?file={}", encode(DRIVE_FILE))
    );
    assert_eq!(
        body["embedUrl"],
        "https://drive.google.com/file/d/1iniNDqBv0dJSNVcyEFcf/preview"
    );
    assert_eq!(body["sections"], json!([]));

    let (status, _) = app
        .get_json(&format!("/api/resources/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
