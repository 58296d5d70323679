//! Array reduction and scalar type coercion
//!
//! Reduction is total. Coercion returns an error for values that cannot be
//! represented in the requested type; the transformer drops the rule.

use super::types::{ArrayHandling, TransformError, TypeHint};
use serde_json::{Number, Value};

/// Collapse a sequence according to `handling`
pub fn reduce_array(values: &[Value], handling: ArrayHandling) -> Option<Value> {
    match handling {
        ArrayHandling::Join => {
            let parts: Vec<String> = values
                .iter()
                .filter(|v| !v.is_null())
                .map(display_string)
                .collect();
            Some(Value::String(parts.join(" ")))
        }
        ArrayHandling::First => values.first().filter(|v| !v.is_null()).cloned(),
        ArrayHandling::Last => values.last().filter(|v| !v.is_null()).cloned(),
        ArrayHandling::Flatten => {
            let mut flat = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::Array(inner) => flat.extend(inner.iter().cloned()),
                    other => flat.push(other.clone()),
                }
            }
            Some(Value::Array(flat))
        }
    }
}

/// Convert a present value to the hinted scalar type
pub fn coerce(value: &Value, hint: TypeHint) -> Result<Value, TransformError> {
    match hint {
        TypeHint::Float => to_float(value),
        TypeHint::Integer => to_integer(value),
        TypeHint::Boolean => to_boolean(value),
        TypeHint::String => Ok(Value::String(display_string(value))),
    }
}

fn to_float(value: &Value) -> Result<Value, TransformError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| TransformError::conversion(type_name(value), TypeHint::Float, value))
}

fn to_integer(value: &Value) -> Result<Value, TransformError> {
    let parsed = match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Ok(value.clone());
            }
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };

    parsed
        .map(Value::from)
        .ok_or_else(|| TransformError::conversion(type_name(value), TypeHint::Integer, value))
}

fn to_boolean(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::Bool(n.as_f64().map(|f| f != 0.0).unwrap_or(false))),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "0" | "off" | "" => Ok(Value::Bool(false)),
            _ => Err(TransformError::conversion("string", TypeHint::Boolean, value)),
        },
        Value::Array(items) => Ok(Value::Bool(!items.is_empty())),
        Value::Object(map) => Ok(Value::Bool(!map.is_empty())),
        Value::Null => Err(TransformError::conversion("null", TypeHint::Boolean, value)),
    }
}

/// Plain-text rendering: strings unquoted, everything else as JSON
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
