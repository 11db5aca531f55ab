//! Cross-cutting pieces shared by the Vault client crates.
//!
//! This crate provides:
//! - A common error type with retryability classification
//! - HTTP client configuration and building
//! - An in-process TTL cache with optional at-rest encryption
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod http;
pub mod tracing_config;

pub use cache::{CacheConfig, LocalCache};
pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
