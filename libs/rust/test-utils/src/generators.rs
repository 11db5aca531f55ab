//! Shared proptest generators.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Vault service token strings.
pub fn client_token_strategy() -> impl Strategy<Value = String> {
    "hvs\\.[A-Za-z0-9]{24,90}"
}

/// Role names as configured on an AppRole mount.
pub fn role_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{2,30}"
}

/// Token lease durations in seconds, up to 32 days.
pub fn lease_duration_strategy() -> impl Strategy<Value = u64> {
    0u64..=2_764_800
}

/// Keys inside a KV bundle.
pub fn secret_key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_.-]{0,31}"
}

/// Secret payloads, including punctuation and non-ASCII text.
pub fn secret_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9!@#$%^&*()_+=-]{1,64}",
        "\\PC{1,32}",
        Just(String::new()),
    ]
}

/// KV bundle contents with 1 to 8 keys.
pub fn kv_data_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(secret_key_strategy(), secret_value_strategy(), 1..8)
}

/// KV mount plus bundle name, e.g. `("secret", "billing-db")`.
pub fn secret_location_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop_oneof![Just("secret".to_string()), "[a-z]{2,10}(/[a-z]{2,10})?"],
        "[a-z][a-z0-9-]{1,20}",
    )
}

/// Version creation times between 2020 and 2030, at whole seconds.
pub fn created_time_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    })
}
