//! Fake Vault server built on wiremock.

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

/// A wiremock server answering the Vault endpoints the client calls.
///
/// Mounts registered with an expected call count are checked by
/// [`MockVault::verify`] and again when the server is dropped.
pub struct MockVault {
    server: MockServer,
}

impl MockVault {
    /// Start a server on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to use as the Vault address.
    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answer AppRole logins for the given credentials, expecting exactly
    /// `expected_calls` of them.
    pub async fn mount_login(
        &self,
        engine_path: &str,
        role_id: &str,
        secret_id: &str,
        status: u16,
        body: Value,
        expected_calls: u64,
    ) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/auth/{engine_path}/login")))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"role_id": role_id, "secret_id": secret_id})))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Answer KV v2 reads of `mount/secret_name` carrying `token`, expecting
    /// exactly `expected_calls` of them.
    pub async fn mount_secret(
        &self,
        mount: &str,
        secret_name: &str,
        token: &str,
        status: u16,
        body: Value,
        expected_calls: u64,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{mount}/data/{secret_name}")))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Like [`MockVault::mount_secret`] but only for `?version={version}`.
    pub async fn mount_secret_version(
        &self,
        mount: &str,
        secret_name: &str,
        version: u64,
        body: Value,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{mount}/data/{secret_name}")))
            .and(query_param("version", version.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer every request with a raw, non-JSON body.
    pub async fn mount_garbage(&self, status: u16, body: &str) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    /// Panic if any mount's expected call count was not met.
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}
