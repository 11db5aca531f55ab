//! HashiCorp Vault client for AppRole login and KV v2 secret reads.
//!
//! [`VaultClient`] logs in with a role id / secret id pair, caches the
//! resulting [`Token`] until it nears expiry, and reads versioned secret
//! bundles, optionally caching them as well. The HTTP transport and the cache
//! backend are injected through the [`HttpTransport`] and [`SecretCache`]
//! traits.
//!
//! Cache reads and writes are not atomic: concurrent callers that miss at the
//! same time will each log in (or fetch) and the last write wins.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secret;
pub mod token;
pub mod transport;
pub mod wire;

mod redact;

pub use cache::SecretCache;
pub use client::{FetchOptions, LoginOptions, VaultClient};
pub use config::VaultConfig;
pub use error::{ErrorKind, VaultError, VaultResult};
pub use provider::VaultApi;
pub use secret::{Secret, SecretBundle};
pub use token::{DEFAULT_GRACE_PERIOD_SECS, Token};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
