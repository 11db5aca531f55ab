//! Cache seam for tokens and secret bundles.

use async_trait::async_trait;
use std::time::Duration;
use vault_common::{LocalCache, PlatformError};

/// Byte-oriented key/value cache.
///
/// A zero TTL means the entry does not expire. Implementations decide their
/// own consistency; the client never assumes `get` followed by `set` is atomic.
#[async_trait]
pub trait SecretCache: Send + Sync {
    /// Look up a live entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError>;

    /// Store an entry.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError>;
}

#[async_trait]
impl SecretCache for LocalCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Self::get(self, key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError> {
        Self::set(self, key, value, ttl).await
    }
}
