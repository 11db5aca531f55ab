//! Vault response bodies for tests.
//!
//! Shapes follow what Vault returns for `auth/approle/login` and KV v2 reads,
//! including fields the client ignores.

use serde_json::{Map, Value, json};

/// Sample AppRole role id.
pub const ROLE_ID: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";

/// Sample AppRole secret id.
pub const SECRET_ID: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";

/// Sample client token.
pub const CLIENT_TOKEN: &str = "hvs.CAESIO5SjAQ5ggMi7HxpZUm5TZeJWZQ5i9425SMFZ";

/// Parameters of a successful login response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFixture {
    /// `auth.client_token`
    pub client_token: String,
    /// `auth.metadata.role_name`
    pub role_name: String,
    /// `auth.lease_duration` in seconds
    pub lease_duration: u64,
    /// `auth.renewable`
    pub renewable: bool,
    /// `auth.num_uses`
    pub num_uses: i64,
}

impl Default for LoginFixture {
    fn default() -> Self {
        Self {
            client_token: CLIENT_TOKEN.to_string(),
            role_name: "test-role-name".to_string(),
            lease_duration: 3600,
            renewable: true,
            num_uses: 2,
        }
    }
}

impl LoginFixture {
    /// Response body.
    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            "request_id": "cccccccc-cccc-cccc-cccc-cccccccccccc",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": null,
            "auth": {
                "client_token": self.client_token,
                "accessor": "dddddddd-dddd-dddd-dddd-dddddddddddd",
                "policies": ["default"],
                "token_policies": ["default"],
                "metadata": {"role_name": self.role_name},
                "lease_duration": self.lease_duration,
                "renewable": self.renewable,
                "entity_id": "",
                "token_type": "service",
                "orphan": true,
                "num_uses": self.num_uses
            }
        })
    }
}

/// KV v2 read response holding string values.
#[must_use]
pub fn kv_response(data: &[(&str, &str)], version: u64, created_time: &str) -> Value {
    let data: Map<String, Value> = data
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect();

    json!({
        "request_id": "eeeeeeee-eeee-eeee-eeee-eeeeeeeeeeee",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": data,
            "metadata": {
                "created_time": created_time,
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": version
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// Vault `errors` body. An empty slice is what Vault sends for a missing bundle.
#[must_use]
pub fn errors_response(messages: &[&str]) -> Value {
    json!({ "errors": messages })
}

/// Vault's multi-error text wrapping a single message.
#[must_use]
pub fn multierror(message: &str) -> String {
    format!("1 error occurred:\n\t* {message}\n\n")
}
