//! Token store over the key-value store
//!
//! The credential is just another entry in the durable store, under a
//! well-known key. Keeping it behind its own port lets the gateway stay
//! ignorant of key names and the shell swap storage without touching
//! auth handling.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ft_core::auth::{AuthToken, AUTH_TOKEN_KEY};
use ft_core::ports::{KeyValueStorePort, TokenStorePort};

pub struct KvTokenStore {
    kv: Arc<dyn KeyValueStorePort>,
    key: String,
}

impl KvTokenStore {
    pub fn new(kv: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            kv,
            key: AUTH_TOKEN_KEY.to_string(),
        }
    }

    /// Store the credential under a non-default key.
    pub fn with_key(kv: Arc<dyn KeyValueStorePort>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }
}

#[async_trait]
impl TokenStorePort for KvTokenStore {
    async fn load(&self) -> Result<Option<AuthToken>> {
        Ok(self.kv.get(&self.key).await?.map(AuthToken::new))
    }

    async fn store(&self, token: &AuthToken) -> Result<()> {
        self.kv.put(&self.key, token.as_str()).await
    }

    async fn clear(&self) -> Result<()> {
        self.kv.remove(&self.key).await
    }
}
