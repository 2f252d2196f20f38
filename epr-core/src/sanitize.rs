//! Input sanitization
//!
//! Trims surrounding whitespace from every string scalar in a JSON value,
//! however deeply nested. Mappings keep their keys and key order, sequences
//! keep their length and order, and non-string scalars pass through as-is.

use serde_json::Value;

/// Trim every string scalar in `value`
///
/// Pure and idempotent: `sanitize(sanitize(v)) == sanitize(v)`.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(trim_owned(s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        other => other,
    }
}

fn trim_owned(s: String) -> String {
    let trimmed = s.trim();
    if trimmed.len() == s.len() {
        s
    } else {
        trimmed.to_string()
    }
}
