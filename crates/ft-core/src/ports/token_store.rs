//! Token storage port - abstracts durable credential storage

use anyhow::Result;
use async_trait::async_trait;

use crate::auth::AuthToken;

/// Durable bearer-credential storage.
///
/// The HTTP gateway reads through this port at send time and never
/// caches, so a token swapped by the shell mid-session takes effect on
/// the very next request.
#[async_trait]
pub trait TokenStorePort: Send + Sync {
    /// The stored credential, or None when signed out.
    async fn load(&self) -> Result<Option<AuthToken>>;

    /// Store `token`, replacing any previous credential.
    async fn store(&self, token: &AuthToken) -> Result<()>;

    /// Forget the stored credential. Clearing an absent credential is
    /// not an error.
    async fn clear(&self) -> Result<()>;
}
