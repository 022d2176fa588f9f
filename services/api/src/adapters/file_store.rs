//! services/api/src/adapters/file_store.rs
//!
//! A `KeyValueStore` persisted as a single JSON object on disk, so the
//! `catalog-sync` client keeps its cached catalog between runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use study_catalog_core::freshness::KeyValueStore;
use study_catalog_core::ports::{PortError, PortResult};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that cannot be parsed is treated the same way and overwritten on the
    /// next write.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "Ignoring unreadable store: {e}");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> PortResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::assert_ok;

    #[test]
    fn values_survive_reopening() {
        let dir = std::env::temp_dir().join(format!("catalog-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("store.json");

        let mut store = assert_ok!(JsonFileStore::open(&path));
        assert_eq!(store.get("catalog:checksum"), None);
        assert_ok!(store.set("catalog:checksum", "abc"));

        let reopened = assert_ok!(JsonFileStore::open(&path));
        assert_eq!(reopened.get("catalog:checksum").as_deref(), Some("abc"));

        std::fs::remove_dir_all(dir).ok();
    }
}
