//! Key-value storage port - abstracts durable device-local persistence
//!
//! Small string map that survives process restarts. The visit flow keeps
//! its open-session shadow here and the token store sits on top of it.

use anyhow::Result;
use async_trait::async_trait;

/// Durable string key/value storage.
///
/// Values are opaque to the store; callers own their key namespace.
/// Each logical key has exactly one writer by construction, so the port
/// does not expose any locking.
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Get the value stored under `key`, or None when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Whether a value is present for `key`.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
