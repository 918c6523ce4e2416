//! List field kind: a homogeneous sequence validated against an item field.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, FieldFailure};

use super::{Field, FieldContext};

/// Validates every element against the item field, collecting per-index
/// failures into one aggregate `invalid_item` error.
pub(crate) fn validate_list(
    field: &Field,
    item: &Field,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(field.error("invalid").into()),
    };

    let mut canonical = Vec::with_capacity(items.len());
    let mut children = IndexMap::new();
    for (index, element) in items.iter().enumerate() {
        match item.validate_in(ctx, element) {
            Ok(v) => canonical.push(v),
            Err(FieldFailure::Invalid(error)) => {
                children.insert(index.to_string(), error);
                if ctx.call.halt_on_error {
                    break;
                }
            }
            Err(fatal) => return Err(fatal),
        }
    }

    if !children.is_empty() {
        return Err(field.error("invalid_item").with_children(children).into());
    }
    Ok(Value::Array(canonical))
}

pub(crate) fn serialize_list(
    field: &Field,
    item: &Field,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    map_items(field, ctx, value, |element| item.serialize_in(ctx, element))
}

pub(crate) fn deserialize_list(
    field: &Field,
    item: &Field,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    map_items(field, ctx, value, |element| {
        item.deserialize_in(ctx, element)
    })
}

// Same per-index aggregation as validation: item hook failures collect into
// an `invalid_item` error instead of vanishing from the output.
fn map_items(
    field: &Field,
    ctx: &FieldContext<'_>,
    value: &Value,
    mut op: impl FnMut(&Value) -> Result<Value, FieldFailure>,
) -> Result<Value, FieldFailure> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::Serialization(format!(
                "cannot serialize {} as List",
                super::scalar::value_type_name(other)
            ))
            .into())
        }
    };
    let mut out = Vec::with_capacity(items.len());
    let mut children = IndexMap::new();
    for (index, element) in items.iter().enumerate() {
        match op(element) {
            Ok(v) => out.push(v),
            Err(FieldFailure::Invalid(error)) => {
                children.insert(index.to_string(), error);
                if ctx.call.halt_on_error {
                    break;
                }
            }
            Err(fatal) => return Err(fatal),
        }
    }
    if !children.is_empty() {
        return Err(field.error("invalid_item").with_children(children).into());
    }
    Ok(Value::Array(out))
}
