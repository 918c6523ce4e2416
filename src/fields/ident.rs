//! UUID field kind.
//!
//! Accepts any textual form the `uuid` crate parses (hyphenated, simple,
//! braced, urn) and canonicalizes to lowercase hyphenated form.

use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, FieldError};

use super::Field;

pub(crate) fn validate_uuid(field: &Field, value: &Value) -> Result<Value, FieldError> {
    let s = match value {
        Value::String(s) => s,
        _ => return Err(field.error("invalid")),
    };
    let parsed = Uuid::parse_str(s).map_err(|_| field.error("invalid"))?;
    Ok(Value::String(parsed.hyphenated().to_string()))
}

pub(crate) fn serialize_uuid(value: &Value) -> Result<Value, Error> {
    match value {
        Value::String(s) => {
            let parsed = Uuid::parse_str(s)
                .map_err(|_| Error::Serialization(format!("'{}' is not a valid UUID", s)))?;
            Ok(Value::String(parsed.hyphenated().to_string()))
        }
        other => Err(Error::Serialization(format!(
            "cannot serialize {} as UUID",
            super::scalar::value_type_name(other)
        ))),
    }
}
