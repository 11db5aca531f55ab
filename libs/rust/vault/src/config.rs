//! Vault client configuration.

use crate::error::{VaultError, VaultResult};
use chrono::Duration;
use url::Url;
use vault_common::HttpConfig;

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address, without a trailing slash
    pub addr: String,
    /// Safety margin before token expiry
    pub token_grace_period: Duration,
    /// Cache key prefix for login tokens
    pub token_cache_prefix: String,
    /// Cache key prefix for secret bundles
    pub secret_cache_prefix: String,
    /// HTTP client settings for the default transport
    pub http: HttpConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: "http://127.0.0.1:8200".to_string(),
            token_grace_period: Duration::seconds(crate::DEFAULT_GRACE_PERIOD_SECS),
            token_cache_prefix: "vault_token".to_string(),
            secret_cache_prefix: "vault_secret".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl VaultConfig {
    /// Create a configuration for the given server address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self::default().with_addr(addr)
    }

    /// Set the server address.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the token grace period.
    #[must_use]
    pub const fn with_token_grace_period(mut self, grace: Duration) -> Self {
        self.token_grace_period = grace;
        self
    }

    /// Set both cache key prefixes.
    #[must_use]
    pub fn with_cache_prefixes(
        mut self,
        token_prefix: impl Into<String>,
        secret_prefix: impl Into<String>,
    ) -> Self {
        self.token_cache_prefix = token_prefix.into();
        self.secret_cache_prefix = secret_prefix.into();
        self
    }

    /// Set HTTP client settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Check the configuration before building a client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidUsage`] for an address that is not an
    /// absolute http(s) URL, a negative grace period, or empty cache prefixes.
    pub fn validate(&self) -> VaultResult<()> {
        let url = Url::parse(&self.addr)
            .map_err(|e| VaultError::invalid_usage(format!("vault address {:?}: {e}", self.addr)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(VaultError::invalid_usage(format!(
                "vault address must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.token_grace_period < Duration::zero() {
            return Err(VaultError::invalid_usage("token grace period must not be negative"));
        }
        if self.token_cache_prefix.is_empty() || self.secret_cache_prefix.is_empty() {
            return Err(VaultError::invalid_usage("cache prefixes must not be empty"));
        }
        Ok(())
    }
}
