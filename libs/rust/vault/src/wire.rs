//! Vault response bodies consumed by the client.
//!
//! Every top-level field is optional so that an `errors` payload, which
//! carries nothing else, decodes into the same type as a success.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body sent to `auth/{engine}/login`.
#[derive(Debug, Serialize)]
pub struct AppRoleLogin<'a> {
    pub role_id: &'a str,
    pub secret_id: &'a str,
}

/// Response of an AppRole login.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub auth: Option<AuthData>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub client_token: String,
    pub lease_duration: u64,
    pub renewable: bool,
    pub metadata: AuthMetadata,
    pub num_uses: i64,
}

#[derive(Debug, Deserialize)]
pub struct AuthMetadata {
    pub role_name: String,
}

/// Response of a KV v2 read.
#[derive(Debug, Deserialize)]
pub struct KvResponse {
    #[serde(default)]
    pub data: Option<KvData>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct KvData {
    /// `null` for a deleted or destroyed version.
    #[serde(default)]
    pub data: Option<HashMap<String, serde_json::Value>>,
    pub metadata: KvMetadata,
}

#[derive(Debug, Deserialize)]
pub struct KvMetadata {
    pub created_time: String,
    pub version: u64,
}

/// First human-readable message from a Vault `errors` entry.
///
/// Vault wraps multiple errors as `"2 errors occurred:\n\t* first\n\t* second\n\n"`;
/// plain single messages are returned trimmed.
#[must_use]
pub fn first_error_message(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("* "))
        .unwrap_or_else(|| raw.trim())
        .to_string()
}
