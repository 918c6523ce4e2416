//! Nested schema and self-reference field kinds.
//!
//! A nested field delegates an object-shaped value to another schema. The
//! target may be held directly, or referenced by name and resolved lazily
//! through a registry so schemas can point at each other before both exist.
//! Self-reference fields delegate to the schema currently processing the
//! field, which supports recursive structures like linked trees.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{Error, FieldFailure};
use crate::registry::{self, RegistryError, SchemaRegistry};
use crate::schema::traversal::{process, Op};
use crate::schema::Schema;

use super::{Field, FieldContext, FieldView};

/// A resolvable reference to a schema.
///
/// `Resolved` holds the target directly; `Named` defers resolution to a
/// registry (the process-wide default unless one was injected) and memoizes
/// the result on first use.
pub(crate) enum SchemaRef {
    Resolved(Arc<Schema>),
    Named {
        name: String,
        registry: Option<SchemaRegistry>,
        cache: RwLock<Option<Arc<Schema>>>,
    },
}

impl SchemaRef {
    pub fn resolved(schema: Schema) -> Self {
        SchemaRef::Resolved(Arc::new(schema))
    }

    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Named {
            name: name.into(),
            registry: None,
            cache: RwLock::new(None),
        }
    }

    /// Resolves the reference, consulting and filling the memo for named
    /// references.
    pub fn resolve(&self) -> Result<Arc<Schema>, RegistryError> {
        match self {
            SchemaRef::Resolved(schema) => Ok(Arc::clone(schema)),
            SchemaRef::Named {
                name,
                registry,
                cache,
            } => {
                if let Some(schema) = cache.read().as_ref() {
                    return Ok(Arc::clone(schema));
                }
                let schema = match registry {
                    Some(custom) => custom.expect(name)?,
                    None => registry::global().expect(name)?,
                };
                *cache.write() = Some(Arc::clone(&schema));
                Ok(schema)
            }
        }
    }

    /// Attaches a custom registry to a named reference. No effect on an
    /// already-resolved reference.
    pub fn with_registry(self, custom: SchemaRegistry) -> Self {
        match self {
            SchemaRef::Named { name, cache, .. } => SchemaRef::Named {
                name,
                registry: Some(custom),
                cache,
            },
            resolved => resolved,
        }
    }
}

impl Clone for SchemaRef {
    fn clone(&self) -> Self {
        match self {
            SchemaRef::Resolved(schema) => SchemaRef::Resolved(Arc::clone(schema)),
            SchemaRef::Named {
                name,
                registry,
                cache,
            } => SchemaRef::Named {
                name: name.clone(),
                registry: registry.clone(),
                cache: RwLock::new(cache.read().clone()),
            },
        }
    }
}

pub(crate) fn validate_nested(
    field: &Field,
    target: &SchemaRef,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    let sub = target.resolve()?;
    validate_sub(field, &sub, view, ctx, value)
}

pub(crate) fn validate_self(
    field: &Field,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    validate_sub(field, ctx.schema, view, ctx, value)
}

fn validate_sub(
    field: &Field,
    sub: &Schema,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    if ctx.depth + 1 > ctx.schema.options().max_depth {
        return Err(field.error("max_depth").into());
    }
    let data = match value {
        Value::Object(map) => map,
        _ => return Err(field.error("invalid_mapping").into()),
    };
    let sub_call = view.sub_call(ctx.call);
    let outcome = process(sub, data, Op::Validate, &sub_call, ctx.depth + 1)
        .map_err(FieldFailure::Fatal)?;
    if !outcome.errors.is_empty() {
        return Err(field.error("invalid").with_children(outcome.errors).into());
    }
    Ok(Value::Object(outcome.output))
}

pub(crate) fn serialize_nested(
    field: &Field,
    target: &SchemaRef,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    let sub = target.resolve()?;
    delegate(field, &sub, view, ctx, value, Op::Serialize)
}

pub(crate) fn serialize_self(
    field: &Field,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    delegate(field, ctx.schema, view, ctx, value, Op::Serialize)
}

pub(crate) fn deserialize_nested(
    field: &Field,
    target: &SchemaRef,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    let sub = target.resolve()?;
    delegate(field, &sub, view, ctx, value, Op::Deserialize)
}

pub(crate) fn deserialize_self(
    field: &Field,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
) -> Result<Value, FieldFailure> {
    delegate(field, ctx.schema, view, ctx, value, Op::Deserialize)
}

// Output passes assume the value was validated already, so the sub call
// always skips re-validation. Sub-field failures (hook errors) still wrap
// under the nested field's key, like validation errors do.
fn delegate(
    field: &Field,
    sub: &Schema,
    view: &FieldView,
    ctx: &FieldContext<'_>,
    value: &Value,
    op: Op,
) -> Result<Value, FieldFailure> {
    if ctx.depth + 1 > ctx.schema.options().max_depth {
        return Err(Error::Serialization("maximum schema depth exceeded".to_string()).into());
    }
    let data: &Map<String, Value> = match value {
        Value::Object(map) => map,
        other => {
            return Err(Error::Serialization(format!(
                "cannot serialize {} as a nested mapping",
                super::scalar::value_type_name(other)
            ))
            .into())
        }
    };
    let mut sub_call = view.sub_call(ctx.call);
    sub_call.skip_validation = true;
    let outcome =
        process(sub, data, op, &sub_call, ctx.depth + 1).map_err(FieldFailure::Fatal)?;
    if !outcome.errors.is_empty() {
        return Err(field.error("invalid").with_children(outcome.errors).into());
    }
    Ok(Value::Object(outcome.output))
}
