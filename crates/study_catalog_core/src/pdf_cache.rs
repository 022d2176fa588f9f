//! crates/study_catalog_core/src/pdf_cache.rs
//!
//! In-memory cache of downloaded PDF bytes keyed by resource or section id.
//! Concurrent requests for the same key share a single download.

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::ports::PortResult;

type InFlight = Shared<BoxFuture<'static, PortResult<Bytes>>>;

#[derive(Default)]
struct Entries {
    bytes: HashMap<String, Bytes>,
    in_flight: HashMap<String, InFlight>,
}

#[derive(Default)]
pub struct PdfBytesCache {
    entries: Mutex<Entries>,
}

impl PdfBytesCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached bytes for `key`, joining or starting a download when
    /// there are none. Failed downloads are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> PortResult<Bytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PortResult<Bytes>> + Send + 'static,
    {
        let download = {
            let mut entries = self.entries();
            if let Some(bytes) = entries.bytes.get(key) {
                debug!(key, "PDF served from cache");
                return Ok(bytes.clone());
            }
            match entries.in_flight.get(key) {
                Some(download) => download.clone(),
                None => {
                    let download = fetch().boxed().shared();
                    entries.in_flight.insert(key.to_string(), download.clone());
                    download
                }
            }
        };

        let result = download.await;

        let mut entries = self.entries();
        entries.in_flight.remove(key);
        if let Ok(bytes) = &result {
            entries.bytes.insert(key.to_string(), bytes.clone());
        }
        result
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().bytes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.bytes.clear();
        entries.in_flight.clear();
    }
}
