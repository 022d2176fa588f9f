//! crates/study_catalog_core/src/freshness.rs
//!
//! Client-side catalog cache. Keeps a local copy of the catalog and only
//! downloads it again when the server's checksum differs from the stored one,
//! checking at most once per cooldown period.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::{CatalogPayload, CatalogResource, CatalogSection, CatalogSubject};
use crate::ports::{PortError, PortResult};

pub const LAST_CHECK_KEY: &str = "catalog:lastCheck";
pub const CHECKSUM_KEY: &str = "catalog:checksum";
pub const DATA_KEY: &str = "catalog:data";

/// Minimum time between two checksum requests.
pub fn cooldown() -> Duration {
    Duration::minutes(5)
}

/// String key/value storage that survives between runs.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> PortResult<()>;
}

/// The two catalog endpoints of the server.
#[async_trait]
pub trait CatalogRemote: Send + Sync {
    async fn fetch_checksum(&self) -> PortResult<String>;
    async fn fetch_catalog(&self) -> PortResult<CatalogPayload>;
}

/// Broadcast to same-process listeners after the stored catalog changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Updated { checksum: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Checked too recently; nothing was requested.
    CoolingDown,
    UpToDate,
    Updated { checksum: String },
    /// The error was logged; the next check after the cooldown tries again.
    Failed(String),
}

pub struct CatalogFreshness<S, R> {
    store: S,
    remote: R,
    events: broadcast::Sender<CatalogEvent>,
}

impl<S: KeyValueStore, R: CatalogRemote> CatalogFreshness<S, R> {
    pub fn new(store: S, remote: R) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            remote,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Runs one freshness check at `now`. Never fails: errors are logged and
    /// reported as [`SyncOutcome::Failed`].
    pub async fn check_and_fetch(&mut self, now: DateTime<Utc>) -> SyncOutcome {
        if self.within_cooldown(now) {
            debug!("Skipping catalog check (cooldown)");
            return SyncOutcome::CoolingDown;
        }

        match self.refresh(now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Catalog refresh failed: {}", e);
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    fn within_cooldown(&self, now: DateTime<Utc>) -> bool {
        let Some(last_check) = self
            .store
            .get(LAST_CHECK_KEY)
            .and_then(|v| v.parse::<i64>().ok())
        else {
            return false;
        };
        now.timestamp_millis() - last_check < cooldown().num_milliseconds()
    }

    async fn refresh(&mut self, now: DateTime<Utc>) -> PortResult<SyncOutcome> {
        self.store
            .set(LAST_CHECK_KEY, &now.timestamp_millis().to_string())?;

        let local_checksum = self.store.get(CHECKSUM_KEY).unwrap_or_default();
        let server_checksum = self.remote.fetch_checksum().await?;
        if local_checksum == server_checksum {
            info!("Catalog up to date");
            return Ok(SyncOutcome::UpToDate);
        }

        info!("Fetching catalog...");
        let payload = self.remote.fetch_catalog().await?;
        let data =
            serde_json::to_string(&payload.data).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(DATA_KEY, &data)?;
        self.store.set(CHECKSUM_KEY, &payload.checksum)?;

        // No subscribers is fine.
        let _ = self.events.send(CatalogEvent::Updated {
            checksum: payload.checksum.clone(),
        });
        info!(checksum = %payload.checksum, "Catalog updated");
        Ok(SyncOutcome::Updated {
            checksum: payload.checksum,
        })
    }

    /// The stored catalog; empty when nothing (or nothing readable) is stored.
    pub fn cached_catalog(&self) -> Vec<CatalogSubject> {
        self.store
            .get(DATA_KEY)
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default()
    }

    pub fn subject_resources(&self, subject_code: &str) -> Vec<CatalogResource> {
        self.cached_catalog()
            .into_iter()
            .find(|s| s.code == subject_code)
            .map(|s| s.resources)
            .unwrap_or_default()
    }

    pub fn resource_sections(&self, subject_code: &str, resource_id: Uuid) -> Vec<CatalogSection> {
        self.subject_resources(subject_code)
            .into_iter()
            .find(|r| r.id == resource_id)
            .map(|r| r.sections)
            .unwrap_or_default()
    }
}

/// A [`KeyValueStore`] kept entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: std::collections::BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> PortResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
