//! Error formatting for the public error view.
//!
//! The traversal accumulates raw [`SchemaErrors`]; an [`ErrorFormatter`]
//! turns that map into the JSON shape exposed by
//! [`Schema::errors_value`](crate::Schema::errors_value). The default
//! [`MapFormatter`] produces `{key: {"msg": ..., "errors": {...}}}`;
//! a custom formatter can be plugged in through
//! [`SchemaOptions`](crate::SchemaOptions).

use serde_json::Value;

use super::field_error::SchemaErrors;

/// Formats accumulated schema errors into a public JSON value.
pub trait ErrorFormatter: Send + Sync {
    /// Renders the raw error map into the public error shape.
    fn format(&self, errors: &SchemaErrors) -> Value;
}

/// The default formatter: nested `{key: {"msg", "errors"?}}` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapFormatter;

impl ErrorFormatter for MapFormatter {
    fn format(&self, errors: &SchemaErrors) -> Value {
        errors.to_value()
    }
}
