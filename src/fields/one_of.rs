//! OneOf field kind: first-match dispatch over a fixed set of fields.

use serde_json::Value;

use crate::error::{Error, FieldFailure};

use super::{Field, FieldContext};

/// Tries each variant in declared order; the first success wins. Structural
/// failures propagate immediately instead of being treated as a mismatch.
pub(crate) fn validate_one_of(
    field: &Field,
    variants: &[Field],
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    for variant in variants {
        match variant.validate_in(ctx, value) {
            Ok(v) => return Ok(v),
            Err(FieldFailure::Invalid(_)) => continue,
            Err(fatal) => return Err(fatal),
        }
    }
    Err(field.error("invalid").into())
}

pub(crate) fn serialize_one_of(
    variants: &[Field],
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    first_match(variants, value, |variant| variant.serialize_in(ctx, value))
}

pub(crate) fn deserialize_one_of(
    variants: &[Field],
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    first_match(variants, value, |variant| variant.deserialize_in(ctx, value))
}

fn first_match(
    variants: &[Field],
    value: &Value,
    mut op: impl FnMut(&Field) -> Result<Value, FieldFailure>,
) -> Result<Value, FieldFailure> {
    for variant in variants {
        match op(variant) {
            Ok(v) => return Ok(v),
            // a serialization mismatch just means this variant is not it
            Err(FieldFailure::Invalid(_)) | Err(FieldFailure::Fatal(Error::Serialization(_))) => {
                continue
            }
            Err(fatal) => return Err(fatal),
        }
    }
    Err(Error::Serialization(format!(
        "{} value does not match any allowed type",
        super::scalar::value_type_name(value)
    ))
    .into())
}
