//! Request Normalizer - raw inputs to a positional feature vector
//!
//! Normalization is total. Missing keys and values that are not numeric
//! become `0.0` instead of rejecting the request.

use serde_json::{Map, Value};

use crate::registry::Disease;

/// Build the model input row for `disease` from arbitrary request inputs.
///
/// One value per feature, in the disease's layout order.
pub fn normalize(disease: Disease, inputs: &Map<String, Value>) -> Vec<f64> {
    disease
        .features()
        .iter()
        .map(|name| lookup(inputs, name).map(coerce_feature_value).unwrap_or(0.0))
        .collect()
}

/// Same as [`normalize`], for an `inputs` value that may not be an object.
pub fn normalize_value(disease: Disease, inputs: &Value) -> Vec<f64> {
    match inputs {
        Value::Object(map) => normalize(disease, map),
        _ => normalize(disease, &Map::new()),
    }
}

/// Exact key first, then the name with spaces replaced by underscores.
fn lookup<'a>(inputs: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = inputs.get(name) {
        return Some(value);
    }
    if name.contains(' ') {
        return inputs.get(&name.replace(' ', "_"));
    }
    None
}

/// Coercion policy for a single feature value.
///
/// Numbers pass through, booleans become 1/0, strings are parsed after
/// trimming. Null, arrays, objects, unparseable strings and non-finite
/// results all become `0.0`.
pub fn coerce_feature_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
