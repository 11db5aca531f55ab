//! The contract hosts program against.

use crate::{
    client::{FetchOptions, LoginOptions},
    error::VaultResult,
    secret::{Secret, SecretBundle},
    token::Token,
};
use async_trait::async_trait;

/// AppRole login and KV v2 reads.
///
/// Implemented by [`crate::VaultClient`]; hosts typically hold an
/// `Arc<dyn VaultApi>` so tests can substitute a fake.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Log in with a role id and secret id, reusing a cached token that is not
    /// yet expired unless `options.refresh_cache` is set.
    async fn login(&self, role_id: &str, secret_id: &str, options: &LoginOptions)
    -> VaultResult<Token>;

    /// Read one key of a secret bundle.
    async fn get_secret(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        key: &str,
        options: &FetchOptions,
    ) -> VaultResult<Secret>;

    /// Read several keys of a secret bundle. A missing key fails the whole call.
    async fn get_secrets(
        &self,
        token: &Token,
        path: &str,
        secret_name: &str,
        keys: &[&str],
        options: &FetchOptions,
    ) -> VaultResult<SecretBundle>;
}
