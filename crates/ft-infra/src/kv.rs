//! File-backed key-value store
//!
//! One JSON object file holding every key. Writes rewrite the file
//! atomically (temp file + rename) so a crash mid-write leaves either
//! the old or the new contents, never a torn file. An interior lock
//! serializes writers; readers see the in-memory map loaded at open.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ft_core::ports::KeyValueStorePort;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_STORE_FILE: &str = "fieldtrack_kv.json";

pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, loading existing entries. A missing or
    /// empty file starts the store empty; a corrupt file is an error
    /// rather than silent data loss.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("parse key-value store failed: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read key-value store failed: {}", path.display()))
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "key-value store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the store under its default filename in `base_dir`.
    pub async fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        Self::open(base_dir.join(DEFAULT_STORE_FILE)).await
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create store dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Atomically rewrite the backing file with the full map.
    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        self.ensure_parent_dir().await?;

        let content =
            serde_json::to_string_pretty(entries).context("serialize key-value store failed")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp store failed: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp store to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        // Removing an absent key is a no-op; skip the file rewrite.
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_starts_empty_when_file_not_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(temp_dir.path().join("kv.json"))
            .await
            .unwrap();
        assert_eq!(store.get("FARMER_VISIT").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(temp_dir.path().join("kv.json"))
            .await
            .unwrap();

        store.put("FARMER_VISIT", "v-9").await.unwrap();
        assert_eq!(
            store.get("FARMER_VISIT").await.unwrap().as_deref(),
            Some("v-9")
        );
        assert!(store.contains("FARMER_VISIT").await.unwrap());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");

        {
            let store = FileKeyValueStore::open(&path).await.unwrap();
            store.put("FARMER_VISIT", "v-9").await.unwrap();
            store
                .put("FARMER_VISIT_STARTED_AT", "2024-05-17T09:30:00+00:00")
                .await
                .unwrap();
        }

        // Fresh instance over the same file stands in for a restart
        let reopened = FileKeyValueStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("FARMER_VISIT").await.unwrap().as_deref(),
            Some("v-9")
        );
        assert_eq!(
            reopened
                .get("FARMER_VISIT_STARTED_AT")
                .await
                .unwrap()
                .as_deref(),
            Some("2024-05-17T09:30:00+00:00")
        );
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");

        let store = FileKeyValueStore::open(&path).await.unwrap();
        store.put("DEALER_VISIT", "v-2").await.unwrap();
        store.remove("DEALER_VISIT").await.unwrap();
        assert_eq!(store.get("DEALER_VISIT").await.unwrap(), None);

        let reopened = FileKeyValueStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("DEALER_VISIT").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(temp_dir.path().join("kv.json"))
            .await
            .unwrap();
        store.remove("NEVER_SET").await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(temp_dir.path().join("kv.json"))
            .await
            .unwrap();
        store.put("AUTH_TOKEN", "old").await.unwrap();
        store.put("AUTH_TOKEN", "new").await.unwrap();
        assert_eq!(
            store.get("AUTH_TOKEN").await.unwrap().as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn test_empty_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let store = FileKeyValueStore::open(&path).await.unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert!(FileKeyValueStore::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_creates_missing_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("kv.json");

        let store = FileKeyValueStore::open(&path).await.unwrap();
        store.put("k", "v").await.unwrap();
        assert!(path.exists());
    }
}
