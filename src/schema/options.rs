//! Schema-level configuration.

use std::sync::Arc;

use crate::encoder::{Encoder, JsonEncoder};
use crate::error::{ErrorFormatter, MapFormatter};

/// Configuration shared by every call on a schema.
///
/// Field-level tri-state options (`allow_none`, `output_missing`) fall back
/// to the values here when not set explicitly on the field.
#[derive(Clone)]
pub struct SchemaOptions {
    /// Schema-wide default for accepting null values.
    pub allow_none: bool,
    /// When true (the default), calls with accumulated field errors return
    /// a validation error; when false, the partial output is returned and
    /// the errors stay readable on the schema.
    pub raise_errors: bool,
    /// Schema-wide default for emitting missing fields.
    pub output_missing: bool,
    /// Maximum nesting depth before recursion is cut off.
    pub max_depth: usize,
    /// Renders accumulated errors for `errors_value`.
    pub formatter: Arc<dyn ErrorFormatter>,
    /// Encodes serialized output for `encode`.
    pub encoder: Arc<dyn Encoder>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            allow_none: false,
            raise_errors: true,
            output_missing: false,
            max_depth: 100,
            formatter: Arc::new(MapFormatter),
            encoder: Arc::new(JsonEncoder),
        }
    }
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_none(mut self, allowed: bool) -> Self {
        self.allow_none = allowed;
        self
    }

    pub fn raise_errors(mut self, raise: bool) -> Self {
        self.raise_errors = raise;
        self
    }

    pub fn output_missing(mut self, emit: bool) -> Self {
        self.output_missing = emit;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn formatter(mut self, formatter: impl ErrorFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }
}
