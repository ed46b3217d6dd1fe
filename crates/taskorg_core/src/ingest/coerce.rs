//! Lenient scalar coercions for client JSON.

use serde_json::Value;

/// JSON truthiness: `false`, `0`, `""`, `null`, `[]` and `{}` are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Text of a string or number field; any other shape counts as empty.
pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

/// Client-supplied id, if it is a non-blank string or a number.
pub(crate) fn supplied_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

/// Coerces integers, floats (truncated), booleans and integer strings.
///
/// Returns `None` when the value has no integer reading.
pub(crate) fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Some(integer);
            }
            if number.is_u64() {
                return None;
            }
            number
                .as_f64()
                .map(f64::trunc)
                .filter(|n| n.is_finite() && *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
                .map(|n| n as i64)
        }
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
