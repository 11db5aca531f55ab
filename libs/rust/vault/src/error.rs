//! Vault error types using thiserror 2.0.
//!
//! Login and secret reads fail with distinct variants for the same kind of
//! failure so callers can tell which step broke; [`VaultError::kind`] folds
//! them back into the shared taxonomy.

use thiserror::Error;
use vault_common::PlatformError;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Login request could not be sent or its response not read
    #[error("Vault login transport failed: {0}")]
    AuthTransport(String),

    /// Login response was not the expected JSON
    #[error("Vault login response could not be decoded: {0}")]
    AuthDecode(String),

    /// Vault rejected the login
    #[error("Vault login failed: {0}")]
    AuthRemote(String),

    /// Secret read could not be sent or its response not read
    #[error("Vault secret fetch transport failed: {0}")]
    FetchTransport(String),

    /// Secret read response was not the expected JSON
    #[error("Vault secret response could not be decoded: {0}")]
    FetchDecode(String),

    /// Vault reported an error for the secret read
    #[error("Vault error: {0}")]
    Remote(String),

    /// Bundle or key does not exist
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Caller passed structurally invalid arguments
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// Error from the shared layer
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Failure kinds shared by login and secret reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The HTTP exchange did not complete
    Transport,
    /// The body was not valid JSON or lacked expected fields
    Decode,
    /// Vault answered with an `errors` payload
    Remote,
    /// Bundle or key missing
    NotFound,
    /// Bad arguments
    InvalidUsage,
    /// Anything else
    Unknown,
}

impl VaultError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthTransport(_) | Self::FetchTransport(_) => ErrorKind::Transport,
            Self::AuthDecode(_) | Self::FetchDecode(_) => ErrorKind::Decode,
            Self::AuthRemote(_) | Self::Remote(_) => ErrorKind::Remote,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidUsage(_) => ErrorKind::InvalidUsage,
            Self::Platform(_) => ErrorKind::Unknown,
        }
    }

    /// Check if error is retryable.
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Platform(e) => e.is_retryable(),
            _ => matches!(self.kind(), ErrorKind::Transport),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid usage error.
    #[must_use]
    pub fn invalid_usage(msg: impl Into<String>) -> Self {
        Self::InvalidUsage(msg.into())
    }
}
