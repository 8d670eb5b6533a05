//! Emptiness checks for loosely-typed package values
//!
//! Packages are produced by a host that treats `null`, `false`, `0`, `""`,
//! `"0"`, `[]` and `{}` as "not set". Every presence check on opaque package
//! data goes through [`is_blank`] so the import pipeline agrees with the
//! exporter on what counts as supplied.

use serde_json::Value;

/// Returns true when `value` counts as "not set"
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Returns true when `value` is absent or blank
pub fn is_blank_opt(value: Option<&Value>) -> bool {
    value.map(is_blank).unwrap_or(true)
}
