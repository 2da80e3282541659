//! Lenient extraction of typed values from a JSON parameter object.
//!
//! Scene configuration arrives as a `serde_json::Value` (CLI `--params`,
//! config files). Numeric and boolean keys that are missing or mistyped fall
//! back to the supplied default so a partial object is always usable.

use serde_json::Value;

/// Reads `params[name]` as `f64`, integers included. Falls back to `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads `params[name]` as a non-negative integer. Falls back to `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Reads `params[name]` as `u64`. Falls back to `default`.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// Reads `params[name]` as a string. Falls back to `default`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads an optional number: `null` or a missing key mean `None`.
///
/// A present key of the wrong type also yields `default`.
pub fn param_opt_f64(params: &Value, name: &str, default: Option<f64>) -> Option<f64> {
    match params.get(name) {
        None => default,
        Some(Value::Null) => None,
        Some(v) => v.as_f64().or(default),
    }
}
