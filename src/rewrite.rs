//! Legacy CDN hostname normalization.
//!
//! Harvested records reference media through CDN hostnames that stopped
//! resolving when the service shut down. Every string leaf is normalized
//! to the canonical archival origin before a record is persisted, so no
//! legacy hostname ever reaches disk.

use serde_json::{Map, Value};

use crate::constants::{CANONICAL_MEDIA_ORIGIN, LEGACY_CDN_HOSTS};

/// Recursively rewrite legacy CDN URLs in a JSON value.
///
/// String leaves containing a legacy host get every
/// `{http,https}://{v,mtc}.cdn.vine.co` occurrence replaced with the
/// canonical origin. Everything else passes through unchanged. The
/// rewrite is idempotent.
#[must_use]
pub fn rewrite_urls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(rewrite_record(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_urls).collect()),
        Value::String(s) => Value::String(rewrite_str(s)),
        other => other,
    }
}

/// Rewrite legacy CDN URLs in every value of a string-keyed record.
#[must_use]
pub fn rewrite_record(record: Map<String, Value>) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(key, value)| (key, rewrite_urls(value)))
        .collect()
}

fn rewrite_str(s: String) -> String {
    if !LEGACY_CDN_HOSTS.iter().any(|host| s.contains(host)) {
        return s;
    }
    let mut out = s;
    for host in LEGACY_CDN_HOSTS {
        for scheme in ["http", "https"] {
            out = out.replace(&format!("{scheme}://{host}"), CANONICAL_MEDIA_ORIGIN);
        }
    }
    out
}
