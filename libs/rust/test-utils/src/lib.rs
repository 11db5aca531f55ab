//! Shared test utilities for the Vault client crates.
//!
//! This crate provides:
//! - Proptest generators for tokens, keys and secret bundles
//! - A wiremock-backed fake Vault server
//! - JSON fixtures matching Vault's login and KV v2 responses

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::MockVault;
