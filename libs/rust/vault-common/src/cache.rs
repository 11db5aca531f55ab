//! In-process key/value cache with per-entry TTL.
//!
//! This is the default backend behind the Vault client's token and secret
//! caches. Values are opaque bytes; when an encryption key is configured they
//! are sealed with AES-256-GCM before they are stored, so secret material is
//! never kept in the map in clear text.

use crate::PlatformError;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;

/// Cache configuration.
#[derive(Clone)]
pub struct CacheConfig {
    /// Prefix applied to every key
    pub namespace: String,
    /// Maximum number of live entries
    pub max_entries: usize,
    /// Encryption key (32 bytes for AES-256)
    pub encryption_key: Option<Zeroizing<[u8; 32]>>,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("namespace", &self.namespace)
            .field("max_entries", &self.max_entries)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "vault".to_string(),
            max_entries: 1024,
            encryption_key: None,
        }
    }
}

impl CacheConfig {
    /// Set the key namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the entry limit.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Enable at-rest encryption.
    #[must_use]
    pub fn with_encryption_key(mut self, key: [u8; 32]) -> Self {
        self.encryption_key = Some(Zeroizing::new(key));
        self
    }
}

struct CacheEntry {
    value: Vec<u8>,
    /// `None` never expires.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process cache with TTL and optional encryption.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Clone)]
pub struct LocalCache {
    namespace: String,
    max_entries: usize,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    cipher: Option<Arc<Aes256Gcm>>,
}

impl fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("namespace", &self.namespace)
            .field("max_entries", &self.max_entries)
            .field("encrypted", &self.cipher.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self {
            namespace: CacheConfig::default().namespace,
            max_entries: CacheConfig::default().max_entries,
            entries: Arc::default(),
            cipher: None,
        }
    }
}

impl LocalCache {
    /// Create a cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is empty or `max_entries` is zero.
    pub fn new(config: CacheConfig) -> Result<Self, PlatformError> {
        if config.namespace.is_empty() {
            return Err(PlatformError::invalid_input("cache namespace must not be empty"));
        }
        if config.max_entries == 0 {
            return Err(PlatformError::invalid_input("cache max_entries must be positive"));
        }

        let cipher = config
            .encryption_key
            .as_ref()
            .map(|key| Arc::new(Aes256Gcm::new(&(**key).into())));

        Ok(Self {
            namespace: config.namespace,
            max_entries: config.max_entries,
            entries: Arc::default(),
            cipher,
        })
    }

    /// Get a live value.
    ///
    /// # Errors
    ///
    /// Returns an error if decryption fails.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let namespaced_key = self.namespaced_key(key);
        let entries = self.entries.read().await;

        match entries.get(&namespaced_key) {
            Some(entry) if entry.is_live(Instant::now()) => self.decrypt(&entry.value).map(Some),
            _ => Ok(None),
        }
    }

    /// Store a value. A zero `ttl` means the entry never expires.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError> {
        let namespaced_key = self.namespaced_key(key);
        let sealed = self.encrypt(value)?;
        let now = Instant::now();
        let expires_at = if ttl.is_zero() { None } else { Some(now + ttl) };

        let mut entries = self.entries.write().await;
        entries.insert(
            namespaced_key.clone(),
            CacheEntry {
                value: sealed,
                expires_at,
            },
        );

        if entries.len() > self.max_entries {
            entries.retain(|_, entry| entry.is_live(now));
        }
        while entries.len() > self.max_entries {
            let victim = entries
                .iter()
                .filter(|(k, _)| **k != namespaced_key)
                .min_by_key(|(_, entry)| (entry.expires_at.is_none(), entry.expires_at))
                .map(|(k, _)| k.clone());
            match victim {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Remove a value.
    pub async fn delete(&self, key: &str) {
        let namespaced_key = self.namespaced_key(key);
        self.entries.write().await.remove(&namespaced_key);
    }

    /// Check whether a live value exists.
    pub async fn contains(&self, key: &str) -> bool {
        let namespaced_key = self.namespaced_key(key);
        self.entries
            .read()
            .await
            .get(&namespaced_key)
            .is_some_and(|entry| entry.is_live(Instant::now()))
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including ones that expired but were not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn namespaced_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, PlatformError> {
        let Some(cipher) = &self.cipher else {
            return Ok(data.to_vec());
        };

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|e| PlatformError::encryption(e.to_string()))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend(ciphertext);
        Ok(sealed)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, PlatformError> {
        let Some(cipher) = &self.cipher else {
            return Ok(data.to_vec());
        };

        if data.len() < NONCE_LEN {
            return Err(PlatformError::encryption("sealed value shorter than nonce"));
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| PlatformError::encryption(e.to_string()))
    }
}
