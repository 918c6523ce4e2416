//! Lifecycle hooks for field processing.
//!
//! Hooks run inside the schema traversal around each field's type-specific
//! operation: `pre_*` hooks may transform the raw value before it is
//! checked, `post_*` hooks may transform the produced value. A hook failure
//! is recorded as a field error, exactly like a failed type check.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::schema::Schema;

/// Context handed to every lifecycle hook.
///
/// Hooks receive the schema currently processing the field, the field's
/// declared key, and the free-form context bag supplied through
/// [`CallOptions::context`](crate::CallOptions::context).
pub struct HookContext<'a> {
    /// The schema running the current operation.
    pub schema: &'a Schema,
    /// The declared key of the field being processed.
    pub key: &'a str,
    /// The caller-supplied context bag.
    pub context: &'a Map<String, Value>,
}

/// A lifecycle hook: transforms a value or fails with a field error.
pub type Hook = Arc<dyn Fn(&HookContext<'_>, Value) -> Result<Value, FieldError> + Send + Sync>;

/// A legacy validator predicate: `false` marks the value invalid.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Hook lists for every lifecycle stage, in declaration order.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub pre_validate: Vec<Hook>,
    pub post_validate: Vec<Hook>,
    pub pre_serialize: Vec<Hook>,
    pub post_serialize: Vec<Hook>,
    pub pre_deserialize: Vec<Hook>,
    pub post_deserialize: Vec<Hook>,
}

/// Folds a value through a hook list, stopping at the first failure.
pub(crate) fn run_hooks(
    hooks: &[Hook],
    ctx: &HookContext<'_>,
    value: Value,
) -> Result<Value, FieldError> {
    let mut current = value;
    for hook in hooks {
        current = hook(ctx, current)?;
    }
    Ok(current)
}
