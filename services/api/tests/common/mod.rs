//! Shared fixtures for the router tests: an in-memory repository, a canned
//! upstream and helpers to drive the router.
#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{self, auth::hash_password, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use study_catalog_core::memory::InMemoryRepository;
use study_catalog_core::ports::{DocumentFetcher, PortError, PortResult, RemoteDocument};
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct horse";
pub const CDN_BASE: &str = "https://cdn.test";

/// Answers fetches from a fixed table and records every requested URL.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Result<Bytes, u16>>,
    pub requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn serving(mut self, url: &str, body: &'static [u8]) -> Self {
        self.responses
            .insert(url.to_string(), Ok(Bytes::from_static(body)));
        self
    }

    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> PortResult<RemoteDocument> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(bytes)) => Ok(RemoteDocument {
                content_length: Some(bytes.len() as u64),
                body: futures::stream::iter(vec![Ok(bytes.clone())]).boxed(),
            }),
            Some(Err(status)) => Err(PortError::Upstream { status: *status }),
            None => Err(PortError::Unexpected("connection refused".to_string())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub fetcher: Arc<StubFetcher>,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        log_level: tracing::Level::DEBUG,
        cdn_base: CDN_BASE.to_string(),
        admin_password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
        allowed_origin: HeaderValue::from_static("http://localhost:3000"),
        upstream_timeout: Duration::from_secs(5),
        seed_subjects: false,
    }
}

pub fn spawn_app(fetcher: StubFetcher) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let fetcher = Arc::new(fetcher);
    let state = Arc::new(AppState {
        db: repo.clone(),
        fetcher: fetcher.clone(),
        config: Arc::new(test_config()),
    });
    TestApp {
        router: web::router(state),
        repo,
        fetcher,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Logs in and returns the `Cookie` header value for admin requests.
    pub async fn login(&self) -> String {
        let request = Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "password": ADMIN_PASSWORD }).to_string(),
            ))
            .unwrap();
        let (status, headers, _) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    pub async fn admin_json(
        &self,
        method: &str,
        uri: &str,
        cookie: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let (status, _, bytes) = self.send(builder.body(body).unwrap()).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
