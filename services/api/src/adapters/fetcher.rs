//! services/api/src/adapters/fetcher.rs
//!
//! Upstream document fetching over HTTP, used by the PDF proxy endpoints and
//! by the `catalog-sync` client.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use std::time::Duration;
use study_catalog_core::ports::{DocumentFetcher, PortError, PortResult, RemoteDocument};
use tracing::{debug, warn};

/// A `DocumentFetcher` backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds a client that follows redirects and gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("study-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> PortResult<RemoteDocument> {
        debug!(url, "Fetching upstream document");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/pdf")
            .send()
            .await
            .map_err(|e| {
                warn!(url, "Upstream request failed: {e}");
                PortError::Unexpected(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Upstream answered with an error");
            return Err(PortError::Upstream {
                status: status.as_u16(),
            });
        }

        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| PortError::Unexpected(e.to_string())))
            .boxed();
        Ok(RemoteDocument {
            content_length,
            body,
        })
    }
}
