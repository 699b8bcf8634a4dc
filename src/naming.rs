//! Key-naming normalization
//!
//! Callers name fields with camelCase while host command parameters use
//! snake_case. Outbound payloads are rewritten here, once, over a plain
//! `serde_json::Value` so the transform does not depend on any request type.

use serde_json::{Map, Value as JsonValue};

/// Rewrite a single key: every ASCII uppercase letter becomes `_` followed by
/// its lowercase form.
///
/// `outputDirectory` becomes `output_directory`; keys without uppercase
/// letters come back unchanged.
pub fn snake_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rewrite every object key in `value` with [`snake_case_key`].
///
/// Arrays keep their order and length, scalars and nulls pass through. The
/// input is never mutated; a new value is returned.
pub fn to_snake_keys(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(to_snake_keys).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (snake_case_key(k), to_snake_keys(v)))
                .collect::<Map<String, JsonValue>>(),
        ),
        other => other.clone(),
    }
}
