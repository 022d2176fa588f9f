//! services/api/src/adapters/catalog_remote.rs
//!
//! HTTP client for the two public catalog endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use study_catalog_core::catalog::CatalogPayload;
use study_catalog_core::freshness::CatalogRemote;
use study_catalog_core::ports::{PortError, PortResult};
use url::Url;

#[derive(Deserialize)]
struct ChecksumBody {
    checksum: String,
}

pub struct HttpCatalogRemote {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalogRemote {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::Invalid(format!("Bad catalog URL: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Upstream {
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl CatalogRemote for HttpCatalogRemote {
    async fn fetch_checksum(&self) -> PortResult<String> {
        let body: ChecksumBody = self.get_json("/api/catalog/checksum").await?;
        Ok(body.checksum)
    }

    async fn fetch_catalog(&self) -> PortResult<CatalogPayload> {
        self.get_json("/api/catalog").await
    }
}
