//! Vault client with token and secret bundle caching.

use crate::{
    cache::SecretCache,
    config::VaultConfig,
    error::{VaultError, VaultResult},
    provider::VaultApi,
    secret::{Secret, SecretBundle},
    token::Token,
    transport::{HttpRequest, HttpTransport, ReqwestTransport},
    wire::{AppRoleLogin, AuthResponse, KvResponse, first_error_message},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};
use url::Url;
use vault_common::{LocalCache, PlatformError};

/// Options for [`VaultClient::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// Mount path of the AppRole auth engine
    pub engine_path: String,
    /// Skip the token cache and always log in
    pub refresh_cache: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            engine_path: "approle".to_string(),
            refresh_cache: false,
        }
    }
}

impl LoginOptions {
    /// Use a different auth mount.
    #[must_use]
    pub fn with_engine_path(mut self, engine_path: impl Into<String>) -> Self {
        self.engine_path = engine_path.into();
        self
    }

    /// Force a fresh login.
    #[must_use]
    pub const fn refreshing(mut self) -> Self {
        self.refresh_cache = true;
        self
    }
}

/// Options for [`VaultClient::get_secret`] and [`VaultClient::get_secrets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bundle version; latest when `None`
    pub version: Option<u64>,
    /// Serve from the secret cache when an entry exists
    pub use_cache: bool,
    /// Ignore any cached entry and fetch
    pub refresh_cache: bool,
    /// TTL of the cache entry written after a fetch; zero never expires
    pub expire: Duration,
}

impl FetchOptions {
    /// Read a specific version.
    #[must_use]
    pub const fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Serve from cache, writing fetched bundles with the given TTL.
    #[must_use]
    pub const fn cached(mut self, expire: Duration) -> Self {
        self.use_cache = true;
        self.expire = expire;
        self
    }

    /// Bypass the cache for this read.
    #[must_use]
    pub const fn refreshing(mut self) -> Self {
        self.refresh_cache = true;
        self
    }
}

/// Vault client for AppRole login and KV v2 reads.
///
/// Stateless apart from the injected cache. A failing cache is treated as a
/// miss on read and is only logged on write.
pub struct VaultClient {
    config: VaultConfig,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn SecretCache>,
}

impl VaultClient {
    /// Create a client with injected collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidUsage`] if the configuration is invalid.
    pub fn new(
        config: VaultConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn SecretCache>,
    ) -> VaultResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            cache,
        })
    }

    /// Create a client using `reqwest` and an in-process [`LocalCache`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn with_defaults(config: VaultConfig) -> VaultResult<Self> {
        let transport = ReqwestTransport::new(&config.http)?;
        Self::new(config, Arc::new(transport), Arc::new(LocalCache::default()))
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Log in, see [`VaultApi::login`].
    ///
    /// # Errors
    ///
    /// [`VaultError::AuthTransport`], [`VaultError::AuthDecode`] or
    /// [`VaultError::AuthRemote`] when the login fails, and
    /// [`VaultError::InvalidUsage`] for an empty role id or engine path.
    #[instrument(skip(self, secret_id, options), fields(engine = %options.engine_path))]
    pub async fn login(
        &self,
        role_id: &str,
        secret_id: &str,
        options: &LoginOptions,
    ) -> VaultResult<Token> {
        if role_id.is_empty() {
            return Err(VaultError::invalid_usage("role_id must not be empty"));
        }
        let engine_path = options.engine_path.trim_matches('/');
        if engine_path.is_empty() {
            return Err(VaultError::invalid_usage("engine_path must not be empty"));
        }

        let cache_key = self.token_cache_key(engine_path, role_id)?;
        if !options.refresh_cache {
            if let Some(token) = self.cached::<Token>(&cache_key).await {
                if !token.is_expired_with_grace(self.config.token_grace_period) {
                    debug!(role_name = token.role_name(), "Using cached Vault token");
                    return Ok(token);
                }
                debug!("Cached Vault token is expired");
            }
        }

        let url = self.api_url(&["auth", engine_path, "login"])?;
        let body = serde_json::to_string(&AppRoleLogin { role_id, secret_id })
            .map_err(PlatformError::from)?;
        let request = HttpRequest::new(Method::POST, url)
            .with_header("Content-Type", "application/json")
            .with_body(body);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| VaultError::AuthTransport(e.to_string()))?;

        let decoded: AuthResponse = serde_json::from_str(&response.body)
            .map_err(|e| VaultError::AuthDecode(e.to_string()))?;

        if let Some(errors) = decoded.errors {
            let message = errors.first().map_or_else(
                || "unknown authentication error".to_string(),
                |raw| first_error_message(raw),
            );
            warn!(status = response.status, %message, "Vault rejected login");
            return Err(VaultError::AuthRemote(message));
        }

        let auth = decoded
            .auth
            .ok_or_else(|| VaultError::AuthDecode("response has no auth block".to_string()))?;

        let lease = auth.lease_duration;
        let expires_at = i64::try_from(lease)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                VaultError::AuthDecode(format!("lease_duration {lease} is out of range"))
            })?;

        let token = Token::new(
            auth.client_token,
            expires_at,
            auth.renewable,
            auth.metadata.role_name,
            auth.num_uses,
        );

        self.store(&cache_key, &token, Duration::from_secs(lease)).await;

        info!(
            role_name = token.role_name(),
            ttl_secs = lease,
            renewable = token.renewable(),
            "Logged in to Vault"
        );
        Ok(token)
    }

    /// Read one key, see [`VaultApi::get_secret`].
    ///
    /// # Errors
    ///
    /// As [`VaultClient::get_secrets`].
    pub async fn get_secret(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        key: &str,
        options: &FetchOptions,
    ) -> VaultResult<Secret> {
        let mut bundle = self
            .get_secrets(token, path, secret_name, &[key], options)
            .await?;

        bundle
            .remove(key)
            .ok_or_else(|| VaultError::not_found(format!("key {key:?} in {path}/{secret_name}")))
    }

    /// Read several keys, see [`VaultApi::get_secrets`].
    ///
    /// # Errors
    ///
    /// [`VaultError::FetchTransport`], [`VaultError::FetchDecode`],
    /// [`VaultError::Remote`] for a non-empty `errors` payload, and
    /// [`VaultError::NotFound`] for an empty one or a missing key.
    #[instrument(skip(self, token, keys, options), fields(version = ?options.version))]
    pub async fn get_secrets(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        keys: &[&str],
        options: &FetchOptions,
    ) -> VaultResult<SecretBundle> {
        let path = path.trim_matches('/');
        if path.is_empty() || secret_name.is_empty() {
            return Err(VaultError::invalid_usage(
                "path and secret_name must not be empty",
            ));
        }

        let cache_key = self.secret_cache_key(path, secret_name, keys, options.version)?;
        if options.use_cache && !options.refresh_cache {
            if let Some(bundle) = self.cached::<SecretBundle>(&cache_key).await {
                debug!(keys = bundle.len(), "Using cached secret bundle");
                return Ok(bundle);
            }
        }

        let mut url = self.api_url(&[path, "data", secret_name])?;
        if let Some(version) = options.version {
            url.query_pairs_mut()
                .append_pair("version", &version.to_string());
        }
        let request = HttpRequest::new(Method::GET, url)
        .with_header("Content-Type", "application/json")
        .with_header("Authorization", format!("Bearer {}", token.token()));

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| VaultError::FetchTransport(e.to_string()))?;

        let decoded: KvResponse = serde_json::from_str(&response.body)
            .map_err(|e| VaultError::FetchDecode(e.to_string()))?;

        if let Some(errors) = decoded.errors {
            let Some(raw) = errors.first() else {
                debug!(status = response.status, "Secret bundle does not exist");
                return Err(VaultError::not_found(format!(
                    "secret bundle {path}/{secret_name}"
                )));
            };
            let message = first_error_message(raw);
            warn!(status = response.status, %message, "Vault rejected secret read");
            return Err(VaultError::Remote(message));
        }

        let data = decoded
            .data
            .ok_or_else(|| VaultError::FetchDecode("response has no data block".to_string()))?;

        let created_at = DateTime::parse_from_rfc3339(&data.metadata.created_time)
            .map_err(|e| {
                VaultError::FetchDecode(format!(
                    "created_time {:?}: {e}",
                    data.metadata.created_time
                ))
            })?
            .with_timezone(&Utc);
        let version = data.metadata.version.to_string();

        let mut bundle = SecretBundle::with_capacity(keys.len());
        for &key in keys {
            let value = match data.data.as_ref().and_then(|values| values.get(key)) {
                None | Some(serde_json::Value::Null) => {
                    return Err(VaultError::not_found(format!(
                        "key {key:?} in {path}/{secret_name}"
                    )));
                }
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            bundle.insert(
                key.to_string(),
                Secret::new(key, value, version.clone(), created_at),
            );
        }

        self.store(&cache_key, &bundle, options.expire).await;

        debug!(keys = bundle.len(), version = %version, "Fetched secret bundle");
        Ok(bundle)
    }

    // Parts are JSON-encoded so separators inside caller text cannot collide.
    fn token_cache_key(&self, engine_path: &str, role_id: &str) -> VaultResult<String> {
        let parts = serde_json::to_string(&(engine_path, role_id)).map_err(PlatformError::from)?;
        Ok(format!("{}.{parts}", self.config.token_cache_prefix))
    }

    fn secret_cache_key(
        &self,
        path: &str,
        secret_name: &str,
        keys: &[&str],
        version: Option<u64>,
    ) -> VaultResult<String> {
        let parts = serde_json::to_string(&(path, secret_name, keys, version))
            .map_err(PlatformError::from)?;
        Ok(format!("{}.{parts}", self.config.secret_cache_prefix))
    }

    /// `{addr}/v1/{segments}`, each `/`-separated piece percent-encoded on its own.
    fn api_url(&self, segments: &[&str]) -> VaultResult<Url> {
        let mut url = Url::parse(&self.config.addr)
            .map_err(|e| VaultError::invalid_usage(format!("vault address: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| VaultError::invalid_usage("vault address cannot carry a path"))?
            .pop_if_empty()
            .push("v1")
            .extend(
                segments
                    .iter()
                    .flat_map(|segment| segment.split('/'))
                    .filter(|segment| !segment.is_empty()),
            );
        Ok(url)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.cache.get(key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Cached entry could not be decoded, treating as miss");
                None
            }
        }
    }

    async fn store<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Could not encode cache entry");
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &bytes, ttl).await {
            warn!(error = %e, "Cache write failed");
        }
    }
}

#[async_trait]
impl VaultApi for VaultClient {
    async fn login(
        &self,
        role_id: &str,
        secret_id: &str,
        options: &LoginOptions,
    ) -> VaultResult<Token> {
        Self::login(self, role_id, secret_id, options).await
    }

    async fn get_secret(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        key: &str,
        options: &FetchOptions,
    ) -> VaultResult<Secret> {
        Self::get_secret(self, token, path, secret_name, key, options).await
    }

    async fn get_secrets(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        keys: &[&str],
        options: &FetchOptions,
    ) -> VaultResult<SecretBundle> {
        Self::get_secrets(self, token, path, secret_name, keys, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, TransportError};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ADDR: &str = "http://test-url.com";

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn replying(bodies: Vec<serde_json::Value>) -> Arc<Self> {
            let transport = Self::default();
            for body in bodies {
                transport.push(Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                }));
            }
            Arc::new(transport)
        }

        fn push(&self, response: Result<HttpResponse, TransportError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> HttpRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
        }
    }

    /// Cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl SecretCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
            Err(PlatformError::unavailable("cache offline"))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), PlatformError> {
            Err(PlatformError::unavailable("cache offline"))
        }
    }

    fn login_body(lease: u64) -> serde_json::Value {
        json!({
            "request_id": "cccccccc-cccc-cccc-cccc-cccccccccccc",
            "auth": {
                "client_token": "hvs.CAESIO5SjAQ5ggMi7HxpZUm5TZeJWZQ5i9425SMFZ",
                "metadata": {"role_name": "test-role-name"},
                "lease_duration": lease,
                "renewable": true,
                "num_uses": 2
            }
        })
    }

    fn kv_body() -> serde_json::Value {
        json!({
            "data": {
                "data": {"a": "1", "b": "2", "port": 5432, "unset": null},
                "metadata": {"created_time": "2024-01-01T00:00:00Z", "version": 3}
            }
        })
    }

    fn client(transport: Arc<ScriptedTransport>, cache: Arc<dyn SecretCache>) -> VaultClient {
        VaultClient::new(VaultConfig::new(ADDR), transport, cache).unwrap()
    }

    fn token() -> Token {
        Token::new(
            "hvs.reader",
            Utc::now() + chrono::Duration::seconds(300),
            false,
            "test",
            0,
        )
    }

    #[tokio::test]
    async fn test_login_builds_token_from_response() {
        let transport = ScriptedTransport::replying(vec![login_body(3600)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        let before = Utc::now();
        let token = client
            .login("role", "secret", &LoginOptions::default())
            .await
            .unwrap();

        assert_eq!(token.token(), "hvs.CAESIO5SjAQ5ggMi7HxpZUm5TZeJWZQ5i9425SMFZ");
        assert_eq!(token.role_name(), "test-role-name");
        assert_eq!(token.uses_left(), 2);
        assert!(token.renewable());
        let lower = before + chrono::Duration::seconds(3600);
        assert!(token.expires_at() >= lower);
        assert!(token.expires_at() <= Utc::now() + chrono::Duration::seconds(3600));

        let request = transport.request(0);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://test-url.com/v1/auth/approle/login");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"role_id": "role", "secret_id": "secret"}));
    }

    #[tokio::test]
    async fn test_login_reuses_cached_token() {
        let transport = ScriptedTransport::replying(vec![login_body(3600)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        let first = client.login("role", "secret", &LoginOptions::default()).await.unwrap();
        let second = client.login("role", "secret", &LoginOptions::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_login_refresh_bypasses_cache() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), login_body(3600)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client.login("role", "secret", &LoginOptions::default()).await.unwrap();
        client
            .login("role", "secret", &LoginOptions::default().refreshing())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_login_within_grace_period_logs_in_again() {
        let transport = ScriptedTransport::replying(vec![login_body(30), login_body(30)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client.login("role", "secret", &LoginOptions::default()).await.unwrap();
        client.login("role", "secret", &LoginOptions::default()).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_login_cache_is_per_role_and_engine() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), login_body(3600)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client.login("role-a", "secret", &LoginOptions::default()).await.unwrap();
        client
            .login("role-a", "secret", &LoginOptions::default().with_engine_path("apps"))
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(transport.request(1).url, "http://test-url.com/v1/auth/apps/login");
    }

    #[tokio::test]
    async fn test_login_remote_error() {
        let transport = ScriptedTransport::replying(vec![json!({
            "errors": ["1 error occurred:\n\t* invalid role or secret ID\n\n"]
        })]);
        let client = client(transport, Arc::new(LocalCache::default()));

        let err = client
            .login("role", "wrong", &LoginOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, VaultError::AuthRemote(ref m) if m == "invalid role or secret ID"));
    }

    #[tokio::test]
    async fn test_login_decode_and_transport_errors() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push(Ok(HttpResponse {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        }));
        transport.push(Ok(HttpResponse {
            status: 200,
            body: json!({"auth": {"client_token": "x"}}).to_string(),
        }));
        transport.push(Err(TransportError::new("connection refused")));
        let client = client(transport, Arc::new(LocalCache::default()));
        let options = LoginOptions::default();

        let err = client.login("role", "secret", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::AuthDecode(_)));

        let err = client.login("role", "secret", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::AuthDecode(_)));

        let err = client.login("role", "secret", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::AuthTransport(ref m) if m == "connection refused"));
    }

    #[tokio::test]
    async fn test_login_rejects_empty_role_id() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        let err = client.login("", "secret", &LoginOptions::default()).await.unwrap_err();

        assert!(matches!(err, VaultError::InvalidUsage(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_broken_cache_is_a_miss() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), login_body(3600)]);
        let client = client(transport.clone(), Arc::new(BrokenCache));

        client.login("role", "secret", &LoginOptions::default()).await.unwrap();
        client.login("role", "secret", &LoginOptions::default()).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_secrets_maps_requested_keys() {
        let transport = ScriptedTransport::replying(vec![kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        let bundle = client
            .get_secrets(&token(), "secret", "app", &["a", "b"], &FetchOptions::default())
            .await
            .unwrap();

        let created = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle["a"], Secret::new("a", "1", "3", created));
        assert_eq!(bundle["b"], Secret::new("b", "2", "3", created));

        let request = transport.request(0);
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "http://test-url.com/v1/secret/data/app");
        assert_eq!(request.header("Authorization"), Some("Bearer hvs.reader"));
    }

    #[tokio::test]
    async fn test_get_secret_non_string_value_rendered_as_json() {
        let transport = ScriptedTransport::replying(vec![kv_body()]);
        let client = client(transport, Arc::new(LocalCache::default()));

        let secret = client
            .get_secret(&token(), "secret", "app", "port", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(secret.value(), "5432");
    }

    #[tokio::test]
    async fn test_get_secret_with_version_adds_query() {
        let transport = ScriptedTransport::replying(vec![kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client
            .get_secret(&token(), "/kv/", "app", "a", &FetchOptions::default().with_version(3))
            .await
            .unwrap();

        assert_eq!(transport.request(0).url, "http://test-url.com/v1/kv/data/app?version=3");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_cache_write() {
        let cache = LocalCache::default();
        let transport = ScriptedTransport::replying(vec![kv_body(), kv_body()]);
        let client = client(transport, Arc::new(cache.clone()));

        let err = client
            .get_secrets(&token(), "secret", "app", &["a", "missing"], &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(ref m) if m.contains("missing")));

        let err = client
            .get_secret(&token(), "secret", "app", "unset", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_remote_errors() {
        let transport = ScriptedTransport::replying(vec![
            json!({"errors": ["1 error occurred:\n\t* permission denied\n\n"]}),
            json!({"errors": []}),
        ]);
        let client = client(transport, Arc::new(LocalCache::default()));
        let options = FetchOptions::default();

        let err = client
            .get_secret(&token(), "secret", "app", "a", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Remote(ref m) if m == "permission denied"));

        let err = client
            .get_secret(&token(), "secret", "app", "a", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_decode_errors() {
        let transport = ScriptedTransport::replying(vec![
            json!({"data": {"data": {"a": "1"}, "metadata": {"created_time": "yesterday", "version": 1}}}),
            json!({"warnings": null}),
        ]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));
        transport.push(Err(TransportError::new("timed out")));
        let options = FetchOptions::default();

        let err = client.get_secret(&token(), "secret", "app", "a", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::FetchDecode(_)));

        let err = client.get_secret(&token(), "secret", "app", "a", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::FetchDecode(_)));

        let err = client.get_secret(&token(), "secret", "app", "a", &options).await.unwrap_err();
        assert!(matches!(err, VaultError::FetchTransport(_)));
    }

    #[tokio::test]
    async fn test_cached_bundle_served_without_network() {
        let transport = ScriptedTransport::replying(vec![kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));
        let options = FetchOptions::default().cached(Duration::from_secs(60));

        let fetched = client
            .get_secrets(&token(), "secret", "app", &["a", "b"], &options)
            .await
            .unwrap();
        let cached = client
            .get_secrets(&token(), "secret", "app", &["a", "b"], &options)
            .await
            .unwrap();

        assert_eq!(fetched, cached);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_includes_keys_and_version() {
        let transport = ScriptedTransport::replying(vec![kv_body(), kv_body(), kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));
        let options = FetchOptions::default().cached(Duration::ZERO);

        client.get_secrets(&token(), "secret", "app", &["a"], &options).await.unwrap();
        client.get_secrets(&token(), "secret", "app", &["a", "b"], &options).await.unwrap();
        client
            .get_secrets(&token(), "secret", "app", &["a"], &options.clone().with_version(3))
            .await
            .unwrap();

        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_secret_cache_keys_do_not_collide_on_separators() {
        let transport = ScriptedTransport::replying(vec![
            json!({"data": {"data": {"password": "PROD-PW"}, "metadata": {"created_time": "2024-01-01T00:00:00Z", "version": 1}}}),
            json!({"data": {"data": {"password": "DEV-PW"}, "metadata": {"created_time": "2024-01-01T00:00:00Z", "version": 1}}}),
            json!({"data": {"data": {"a,b": "joined"}, "metadata": {"created_time": "2024-01-01T00:00:00Z", "version": 1}}}),
            kv_body(),
        ]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));
        let options = FetchOptions::default().cached(Duration::ZERO);

        let prod = client
            .get_secret(&token(), "secret.app", "db", "password", &options)
            .await
            .unwrap();
        let dev = client
            .get_secret(&token(), "secret", "app.db", "password", &options)
            .await
            .unwrap();
        assert_eq!(prod.value(), "PROD-PW");
        assert_eq!(dev.value(), "DEV-PW");
        assert_eq!(transport.request(1).url, "http://test-url.com/v1/secret/data/app.db");

        let joined = client
            .get_secrets(&token(), "secret", "app", &["a,b"], &options)
            .await
            .unwrap();
        let split = client
            .get_secrets(&token(), "secret", "app", &["a", "b"], &options)
            .await
            .unwrap();
        assert_eq!(joined["a,b"].value(), "joined");
        assert_eq!(split["a"].value(), "1");
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_token_cache_keys_do_not_collide_on_separators() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), login_body(3600)]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client
            .login("c", "secret", &LoginOptions::default().with_engine_path("a.b"))
            .await
            .unwrap();
        client
            .login("b.c", "secret", &LoginOptions::default().with_engine_path("a"))
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(transport.request(1).url, "http://test-url.com/v1/auth/a/login");
    }

    #[tokio::test]
    async fn test_deleted_version_is_not_found() {
        let cache = LocalCache::default();
        let transport = ScriptedTransport::replying(vec![json!({
            "data": {
                "data": null,
                "metadata": {
                    "created_time": "2024-01-01T00:00:00Z",
                    "deletion_time": "2024-02-01T00:00:00Z",
                    "destroyed": false,
                    "version": 4
                }
            }
        })]);
        let client = client(transport, Arc::new(cache.clone()));

        let err = client
            .get_secret(&token(), "secret", "app", "a", &FetchOptions::default().with_version(4))
            .await
            .unwrap_err();

        assert!(matches!(err, VaultError::NotFound(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_reserved_characters_are_encoded_in_urls() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        let token = client
            .login("role", "secret", &LoginOptions::default().with_engine_path("team/app role"))
            .await
            .unwrap();
        client
            .get_secret(&token, "kv/team", "db?x#y", "a", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            transport.request(0).url,
            "http://test-url.com/v1/auth/team/app%20role/login"
        );
        assert_eq!(
            transport.request(1).url,
            "http://test-url.com/v1/kv/team/data/db%3Fx%23y"
        );
    }

    #[tokio::test]
    async fn test_refresh_cache_refetches() {
        let transport = ScriptedTransport::replying(vec![kv_body(), kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));
        let options = FetchOptions::default().cached(Duration::ZERO);

        client.get_secret(&token(), "secret", "app", "a", &options).await.unwrap();
        client
            .get_secret(&token(), "secret", "app", "a", &options.clone().refreshing())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_not_read_without_use_cache() {
        let transport = ScriptedTransport::replying(vec![kv_body(), kv_body()]);
        let client = client(transport.clone(), Arc::new(LocalCache::default()));

        client.get_secret(&token(), "secret", "app", "a", &FetchOptions::default()).await.unwrap();
        client.get_secret(&token(), "secret", "app", "a", &FetchOptions::default()).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_through_trait_object() {
        let transport = ScriptedTransport::replying(vec![login_body(3600), kv_body()]);
        let api: Arc<dyn VaultApi> = Arc::new(client(transport, Arc::new(LocalCache::default())));

        let token = api.login("role", "secret", &LoginOptions::default()).await.unwrap();
        let secret = api
            .get_secret(&token, "secret", "app", "b", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(secret.value(), "2");
    }
}
