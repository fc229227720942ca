//! Lenient accessors for JSON parameter objects.
//!
//! Simulation overrides arrive as a free-form `serde_json::Value`. Each
//! accessor returns `default` when the key is missing or has the wrong type,
//! so a partial or sloppy override object never fails a run.

use serde_json::Value;

/// `params[name]` as an `f64`. Integers are widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a `usize`, only for non-negative integers.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Shallow merge: keys of `overrides` replace those of `base`.
///
/// Non-object inputs leave `base` unchanged.
pub fn merge_params(base: &mut Value, overrides: &Value) {
    if let (Value::Object(base), Value::Object(overrides)) = (base, overrides) {
        for (k, v) in overrides {
            base.insert(k.clone(), v.clone());
        }
    }
}
