//! Date and datetime field kinds, backed by chrono.
//!
//! Both kinds accept string input only and canonicalize: dates normalize to
//! `YYYY-MM-DD`, datetimes keep their offset when one was given and render
//! naive timestamps as `%Y-%m-%dT%H:%M:%S%.f`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{Error, FieldError};

use super::Field;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn validate_date(field: &Field, value: &Value) -> Result<Value, FieldError> {
    let s = match value {
        Value::String(s) => s,
        _ => return Err(field.error("invalid")),
    };
    let date = parse_date(s).ok_or_else(|| field.error("invalid"))?;
    Ok(Value::String(date.format(DATE_FORMAT).to_string()))
}

pub(crate) fn serialize_date(value: &Value) -> Result<Value, Error> {
    match value {
        Value::String(s) => {
            let date = parse_date(s).ok_or_else(|| {
                Error::Serialization(format!("'{}' is not a valid date", s))
            })?;
            Ok(Value::String(date.format(DATE_FORMAT).to_string()))
        }
        other => Err(Error::Serialization(format!(
            "cannot serialize {} as Date",
            super::scalar::value_type_name(other)
        ))),
    }
}

pub(crate) fn validate_datetime(field: &Field, value: &Value) -> Result<Value, FieldError> {
    let s = match value {
        Value::String(s) => s,
        _ => return Err(field.error("invalid")),
    };
    canonical_datetime(s).ok_or_else(|| field.error("invalid")).map(Value::String)
}

pub(crate) fn serialize_datetime(value: &Value) -> Result<Value, Error> {
    match value {
        Value::String(s) => canonical_datetime(s)
            .ok_or_else(|| Error::Serialization(format!("'{}' is not a valid datetime", s)))
            .map(Value::String),
        other => Err(Error::Serialization(format!(
            "cannot serialize {} as DateTime",
            super::scalar::value_type_name(other)
        ))),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn canonical_datetime(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(s) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, NAIVE_DATETIME_FORMAT) {
        return Some(dt.format(NAIVE_DATETIME_FORMAT).to_string());
    }
    // A bare date promotes to midnight.
    if let Some(date) = parse_date(s) {
        let dt = date.and_hms_opt(0, 0, 0)?;
        return Some(dt.format(NAIVE_DATETIME_FORMAT).to_string());
    }
    None
}
