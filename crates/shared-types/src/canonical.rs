//! # Canonical JSON
//!
//! Deterministic serialization for hashing and signing: object keys sorted at
//! every depth, compact separators, no trailing whitespace.
//!
//! Keys are re-inserted in sorted order rather than relying on the map type,
//! so the output stays canonical even if `serde_json/preserve_order` is
//! enabled somewhere in the dependency graph.

use serde_json::{Map, Value};

/// Return a copy of `value` with every object's keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical byte encoding of `value`.
pub fn canonical_json(value: &Value) -> Vec<u8> {
    canonicalize(value).to_string().into_bytes()
}
