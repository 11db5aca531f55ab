//! Vault client token.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds subtracted from a token's expiry when judging staleness.
pub const DEFAULT_GRACE_PERIOD_SECS: i64 = 60;

/// Bearer credential returned by an AppRole login.
///
/// Only the use counter is mutable. The counter is bookkeeping for callers:
/// nothing stops a token from being used after it reaches zero.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(with = "crate::redact")]
    token: SecretString,
    expires_at: DateTime<Utc>,
    renewable: bool,
    role_name: String,
    num_uses_left: i64,
}

impl Token {
    /// Create a token.
    pub fn new(
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
        renewable: bool,
        role_name: impl Into<String>,
        num_uses_left: i64,
    ) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at,
            renewable,
            role_name: role_name.into(),
            num_uses_left,
        }
    }

    /// The bearer string sent in `Authorization` headers.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Absolute expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether Vault reported the token as renewable.
    #[must_use]
    pub const fn renewable(&self) -> bool {
        self.renewable
    }

    /// Role the token was issued for.
    #[must_use]
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Remaining uses as tracked locally.
    #[must_use]
    pub const fn uses_left(&self) -> i64 {
        self.num_uses_left
    }

    /// Record one use of the token.
    pub fn consume_use(&mut self) {
        self.num_uses_left -= 1;
    }

    /// Expired with the default 60 second grace period.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_grace(Duration::seconds(DEFAULT_GRACE_PERIOD_SECS))
    }

    /// True when `expires_at - grace` is already in the past.
    #[must_use]
    pub fn is_expired_with_grace(&self, grace: Duration) -> bool {
        self.is_expired_at(Utc::now(), grace)
    }

    /// [`Token::is_expired_with_grace`] evaluated at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.expires_at - grace < now
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.token.expose_secret() == other.token.expose_secret()
            && self.expires_at == other.expires_at
            && self.renewable == other.renewable
            && self.role_name == other.role_name
            && self.num_uses_left == other.num_uses_left
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("renewable", &self.renewable)
            .field("role_name", &self.role_name)
            .field("num_uses_left", &self.num_uses_left)
            .finish()
    }
}
