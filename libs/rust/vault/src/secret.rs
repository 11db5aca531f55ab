//! A single key/value pair read from a KV v2 secret bundle.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Requested keys mapped to their secrets.
pub type SecretBundle = HashMap<String, Secret>;

/// Immutable secret value with the metadata of the version it came from.
#[derive(Clone, Serialize, Deserialize)]
pub struct Secret {
    key: String,
    #[serde(with = "crate::redact")]
    value: SecretString,
    version: String,
    created_at: DateTime<Utc>,
}

impl Secret {
    /// Create a secret.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        version: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            value: SecretString::from(value.into()),
            version: version.into(),
            created_at,
        }
    }

    /// Key within the bundle.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The secret payload.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    /// Bundle version the value was read from.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Creation time of that version.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value.expose_secret() == other.value.expose_secret()
            && self.version == other.version
            && self.created_at == other.created_at
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("key", &self.key)
            .field("value", &"[REDACTED]")
            .field("version", &self.version)
            .field("created_at", &self.created_at)
            .finish()
    }
}
