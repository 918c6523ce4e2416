//! Scalar field kinds: string, integer, float, boolean, dict, anything.

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, FieldError};

use super::Field;

/// Configuration for the string kind.
#[derive(Clone)]
pub(crate) struct StringOpts {
    pub trim: bool,
    pub allow_empty: bool,
    pub pattern: Option<Regex>,
}

impl StringOpts {
    pub fn new() -> Self {
        Self {
            trim: false,
            allow_empty: true,
            pattern: None,
        }
    }
}

pub(crate) fn validate_string(
    field: &Field,
    opts: &StringOpts,
    value: &Value,
) -> Result<Value, FieldError> {
    let s = match value {
        Value::String(s) => s,
        _ => return Err(field.error("invalid")),
    };
    let canonical = if opts.trim { s.trim() } else { s.as_str() };
    if !opts.allow_empty && canonical.is_empty() {
        return Err(field.error("empty"));
    }
    if let Some(pattern) = &opts.pattern {
        if !pattern.is_match(canonical) {
            return Err(field.error("pattern"));
        }
    }
    Ok(Value::String(canonical.to_string()))
}

pub(crate) fn serialize_string(opts: &StringOpts, value: &Value) -> Result<Value, Error> {
    match value {
        Value::String(s) if opts.trim => Ok(Value::String(s.trim().to_string())),
        Value::String(_) => Ok(value.clone()),
        other => Err(not_serializable("String", other)),
    }
}

pub(crate) fn validate_integer(
    field: &Field,
    strict: bool,
    value: &Value,
) -> Result<Value, FieldError> {
    if let Value::Number(n) = value {
        if n.is_i64() || n.is_u64() {
            return Ok(value.clone());
        }
        if !strict {
            // A float with no fractional part coerces down in lax mode. The
            // upper bound is exclusive: i64::MAX as f64 rounds up to 2^63,
            // which is out of range and would saturate the cast.
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    return Ok(Value::from(f as i64));
                }
            }
        }
    }
    Err(field.error("invalid"))
}

pub(crate) fn serialize_integer(value: &Value) -> Result<Value, Error> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        other => Err(not_serializable("Integer", other)),
    }
}

pub(crate) fn validate_float(
    field: &Field,
    strict: bool,
    value: &Value,
) -> Result<Value, FieldError> {
    if let Value::Number(n) = value {
        if n.is_f64() {
            return Ok(value.clone());
        }
        if !strict {
            // Integers upcast in lax mode.
            if let Some(f) = n.as_f64() {
                if let Some(upcast) = serde_json::Number::from_f64(f) {
                    return Ok(Value::Number(upcast));
                }
            }
        }
    }
    Err(field.error("invalid"))
}

pub(crate) fn serialize_float(value: &Value) -> Result<Value, Error> {
    match value {
        Value::Number(n) if n.as_f64().is_some() => Ok(value.clone()),
        other => Err(not_serializable("Float", other)),
    }
}

pub(crate) fn validate_boolean(field: &Field, value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        _ => Err(field.error("invalid")),
    }
}

pub(crate) fn serialize_boolean(value: &Value) -> Result<Value, Error> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        other => Err(not_serializable("Boolean", other)),
    }
}

pub(crate) fn validate_dict(field: &Field, value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        _ => Err(field.error("invalid")),
    }
}

pub(crate) fn serialize_dict(value: &Value) -> Result<Value, Error> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        other => Err(not_serializable("Dict", other)),
    }
}

fn not_serializable(kind: &str, value: &Value) -> Error {
    Error::Serialization(format!(
        "cannot serialize {} as {}",
        value_type_name(value),
        kind
    ))
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
