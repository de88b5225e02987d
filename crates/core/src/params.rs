//! Lenient readers for the free-form `params` object in a sketch config.
//!
//! A missing key, a `null`, or a value of the wrong JSON type falls back to
//! the sketch's default. Tuning a sketch from a JSON file should never stop
//! it from starting.

use serde_json::Value;

use crate::frame::Rgba;

/// `params[name]` as a float; integers are widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a float clamped to `[min, max]`. Non-finite values
/// fall back to `default`.
pub fn param_f64_clamped(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    let v = param_f64(params, name, default);
    if v.is_finite() {
        v.clamp(min, max)
    } else {
        default
    }
}

/// `params[name]` as a count. Negative or fractional numbers use `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// `params[name]` as an octave count, at least 1.
pub fn param_octaves(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
        .max(1)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// `params[name]` as a `"#rrggbb"` color.
pub fn param_color(params: &Value, name: &str, default: Rgba) -> Rgba {
    params
        .get(name)
        .and_then(Value::as_str)
        .and_then(|hex| Rgba::from_hex(hex).ok())
        .unwrap_or(default)
}
