//! The unified per-field traversal behind validate, serialize and
//! deserialize.
//!
//! One pass over the active element set, parameterized by operation. The
//! output passes (serialize/deserialize) run type validation first unless
//! the call skips it, and reuse the canonical values the validate step
//! produced.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, FieldError, FieldFailure};
use crate::fields::{extract_path, run_hooks, Field, FieldContext, HookContext};

use super::{CallOptions, Schema};

/// The operation driving a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Validate,
    Serialize,
    Deserialize,
}

/// The result of one traversal: the produced map plus any field errors
/// accumulated along the way.
pub(crate) struct Outcome {
    pub output: Map<String, Value>,
    pub errors: IndexMap<String, FieldError>,
}

/// Computes the active element set for one call, in declaration order.
///
/// The base set is required/defaulted/output-missing fields plus fields
/// present in the input (by declared key or load alias). `tags` replaces
/// the set with the union of tagged fields, `whitelist` replaces it with
/// exactly the named fields, and `exclude` always subtracts last.
fn active_elements<'a>(
    schema: &'a Schema,
    data: &Map<String, Value>,
    call: &CallOptions,
) -> Vec<(&'a String, &'a Field)> {
    let fields = schema.fields();
    let mut active: HashSet<&str> = HashSet::new();

    if call.tags.is_empty() {
        for (key, field) in fields {
            let base = field.required
                || field.default.is_some()
                || field.output_missing.resolve(schema.options().output_missing);
            let present = match field.child_path() {
                Some(path) => extract_path(data, path).is_some(),
                None => lookup(field, key, data).is_some(),
            };
            if base || present {
                active.insert(key.as_str());
            }
        }
    } else {
        for (key, field) in fields {
            if field.tags.iter().any(|tag| call.tags.contains(tag)) {
                active.insert(key.as_str());
            }
        }
    }

    if !call.whitelist.is_empty() {
        active = fields
            .keys()
            .filter(|key| call.whitelist.iter().any(|allowed| allowed == *key))
            .map(String::as_str)
            .collect();
    }
    for excluded in &call.exclude {
        active.remove(excluded.as_str());
    }

    fields
        .iter()
        .filter(|(key, _)| active.contains(key.as_str()))
        .collect()
}

/// Resolves a field's input value: the load alias first, then the declared
/// key, then the serialized rename, so serialized output deserializes back.
fn lookup<'a>(field: &Field, key: &str, data: &'a Map<String, Value>) -> Option<&'a Value> {
    data.get(field.input_key(key))
        .or_else(|| data.get(key))
        .or_else(|| field.serialized_key().and_then(|name| data.get(name)))
}

/// Runs one traversal over the schema's active elements.
///
/// Field-level failures accumulate into the outcome's error map; structural
/// failures (registry misses, serializer failures) abort immediately.
pub(crate) fn process(
    schema: &Schema,
    data: &Map<String, Value>,
    op: Op,
    call: &CallOptions,
    depth: usize,
) -> Result<Outcome, Error> {
    let mut output = Map::new();
    let mut errors: IndexMap<String, FieldError> = IndexMap::new();
    let do_validate = op == Op::Validate || !call.skip_validation;

    for (key, field) in active_elements(schema, data, call) {
        // 1. resolve the raw value; serialize prefers the declared key
        let mut raw: Option<Value> = if let Some(path) = field.child_path() {
            extract_path(data, path)
        } else if op == Op::Serialize {
            data.get(key.as_str())
                .or_else(|| data.get(field.input_key(key)))
                .cloned()
        } else {
            lookup(field, key, data).cloned()
        };

        // 2. materialize a default for a missing value
        if raw.is_none() {
            if let Some(default) = &field.default {
                raw = Some(default.produce(schema, field));
            }
        }
        let allow_none = field.allow_none.resolve(schema.options().allow_none);
        let output_missing = field
            .output_missing
            .resolve(schema.options().output_missing);

        // 3. absent, optional and not emitted: contributes nothing
        if raw.is_none() && !field.required && !output_missing {
            continue;
        }

        // 4. validate
        let mut canonical: Option<Value> = None;
        let mut direct = false;
        let mut errored = false;
        if do_validate {
            match validate_field(schema, field, key, call, depth, raw.as_ref(), allow_none) {
                Ok((value, emitted_directly)) => {
                    canonical = Some(value);
                    direct = emitted_directly;
                }
                Err(FieldFailure::Invalid(error)) => {
                    errors.insert(key.clone(), error);
                    errored = true;
                    if call.halt_on_error {
                        break;
                    }
                }
                Err(FieldFailure::Fatal(error)) => return Err(error),
            }
        }
        if errored {
            continue;
        }

        // 5./6. produce output
        let produced: Result<Option<(String, Value)>, FieldFailure> = match op {
            Op::Validate => Ok(canonical.map(|value| (key.clone(), value))),
            Op::Serialize => {
                let out_key = field.output_key(key).to_string();
                emit(schema, field, key, call, depth, canonical, direct, raw, allow_none, op)
                    .map(|value| Some((out_key, value)))
            }
            Op::Deserialize => {
                emit(schema, field, key, call, depth, canonical, direct, raw, allow_none, op)
                    .map(|value| Some((key.clone(), value)))
            }
        };
        match produced {
            Ok(Some((out_key, value))) => {
                output.insert(out_key, value);
            }
            Ok(None) => {}
            Err(FieldFailure::Invalid(error)) => {
                errors.insert(key.clone(), error);
                if call.halt_on_error {
                    break;
                }
            }
            Err(FieldFailure::Fatal(error)) => return Err(error),
        }
    }

    Ok(Outcome { output, errors })
}

/// Applies the missing/none/required matrix around the type-specific check.
///
/// Returns the canonical value and whether it should be emitted directly on
/// the output passes (nulls accepted via allow-none and missing-output
/// placeholders bypass the type serializer).
fn validate_field(
    schema: &Schema,
    field: &Field,
    key: &str,
    call: &CallOptions,
    depth: usize,
    raw: Option<&Value>,
    allow_none: bool,
) -> Result<(Value, bool), FieldFailure> {
    let value = match raw {
        Some(value) => value.clone(),
        None => {
            if field.required {
                return Err(field.error("required").into());
            }
            // missing with output-missing in effect
            return Ok((field.missing_output_value.clone(), true));
        }
    };

    let hctx = HookContext {
        schema,
        key,
        context: &call.context,
    };
    let value = run_hooks(&field.hooks.pre_validate, &hctx, value)?;

    if value.is_null() {
        if allow_none {
            return Ok((Value::Null, true));
        }
        if field.required {
            return Err(field.error("required").into());
        }
    }

    let fctx = FieldContext {
        schema,
        key,
        call,
        depth,
    };
    let canonical = field.validate_in(&fctx, &value)?;
    let canonical = run_hooks(&field.hooks.post_validate, &hctx, canonical)?;
    Ok((canonical, false))
}

/// Produces one field's output value for the serialize/deserialize passes.
#[allow(clippy::too_many_arguments)]
fn emit(
    schema: &Schema,
    field: &Field,
    key: &str,
    call: &CallOptions,
    depth: usize,
    canonical: Option<Value>,
    direct: bool,
    raw: Option<Value>,
    allow_none: bool,
    op: Op,
) -> Result<Value, FieldFailure> {
    // prefer the canonical value from the validate pass
    let value = match canonical {
        Some(value) => {
            if direct {
                return Ok(value);
            }
            value
        }
        None => match raw {
            // validation was skipped: missing means output-missing applies
            None => return Ok(field.missing_output_value.clone()),
            Some(value) if value.is_null() && allow_none => return Ok(Value::Null),
            Some(value) => value,
        },
    };

    let hctx = HookContext {
        schema,
        key,
        context: &call.context,
    };
    let fctx = FieldContext {
        schema,
        key,
        call,
        depth,
    };
    match op {
        Op::Serialize => {
            let value = run_hooks(&field.hooks.pre_serialize, &hctx, value)?;
            let value = field.serialize_in(&fctx, &value)?;
            run_hooks(&field.hooks.post_serialize, &hctx, value).map_err(Into::into)
        }
        Op::Deserialize => {
            let value = run_hooks(&field.hooks.pre_deserialize, &hctx, value)?;
            let value = field.deserialize_in(&fctx, &value)?;
            run_hooks(&field.hooks.post_deserialize, &hctx, value).map_err(Into::into)
        }
        Op::Validate => Ok(value),
    }
}
