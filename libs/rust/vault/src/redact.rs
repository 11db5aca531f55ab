//! Serde glue for `SecretString` fields written to the cache.
//!
//! `SecretString` does not implement `Serialize`. Cached tokens and secrets
//! must round-trip through the byte-oriented cache, so the plain value is
//! exposed here and nowhere else.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.expose_secret())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
