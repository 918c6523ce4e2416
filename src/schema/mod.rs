//! Schema declaration and the public validate/serialize/deserialize/encode
//! operations.
//!
//! A [`Schema`] is an ordered table of named [`Field`]s plus a
//! [`SchemaOptions`]. All operations take any `Serialize` input that views
//! as a key-value mapping, run the unified traversal over the active
//! element set, and either return the produced map (or [`Instance`]) or
//! fail with the accumulated error tree.
//!
//! # Example
//!
//! ```rust
//! use trellis::{Field, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Actor")
//!     .field("first_name", Field::string().required())
//!     .field("last_name", Field::string().required())
//!     .build();
//!
//! let err = schema.validate(&json!({"first_name": "Harrison"})).unwrap_err();
//! let errors = err.as_validation().unwrap();
//! assert_eq!(errors.get("last_name").unwrap().code, "required");
//! ```

mod options;
mod poly;
pub(crate) mod traversal;

pub use options::SchemaOptions;
pub use poly::{PolySchema, PolySchemaBuilder};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{Error, SchemaErrors};
use crate::fields::{value_type_name, Field};
use crate::ValidationResult;

use traversal::{process, Op};

/// Per-call options for schema operations.
///
/// ```rust
/// use trellis::CallOptions;
///
/// let call = CallOptions::new()
///     .halt_on_error()
///     .exclude(["internal_id"])
///     .context("locale", "en");
/// ```
#[derive(Clone, Default)]
pub struct CallOptions {
    pub(crate) halt_on_error: bool,
    pub(crate) skip_validation: bool,
    pub(crate) skip_serialization: bool,
    pub(crate) exclude: Vec<String>,
    pub(crate) whitelist: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) context: Map<String, Value>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the traversal at the first field error instead of
    /// accumulating all of them.
    pub fn halt_on_error(mut self) -> Self {
        self.halt_on_error = true;
        self
    }

    /// Skips the validate pass before serialize/deserialize. The input is
    /// trusted to already be canonical.
    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }

    /// For `encode`: skips the serialize pass and encodes the input as-is.
    pub fn skip_serialization(mut self) -> Self {
        self.skip_serialization = true;
        self
    }

    /// Removes fields from the active element set.
    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the active element set to exactly these fields.
    pub fn whitelist<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the active element set with the fields registered under
    /// these tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an entry to the context bag handed to lifecycle hooks.
    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// A named, ordered field table with schema-level options.
pub struct Schema {
    name: String,
    fields: IndexMap<String, Field>,
    options: SchemaOptions,
    last_errors: RwLock<Option<SchemaErrors>>,
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            options: self.options.clone(),
            last_errors: RwLock::new(self.last_errors.read().clone()),
        }
    }
}

impl Schema {
    /// Starts building a schema with the given name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: IndexMap::new(),
            options: SchemaOptions::default(),
        }
    }

    /// The schema's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field keys, in declaration order.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    /// The schema-level options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Validates the input, returning the canonical map.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] with the accumulated error tree when any field
    /// fails (and `raise_errors` is set); [`Error::Input`] when the input
    /// does not view as a mapping.
    pub fn validate<T: Serialize>(&self, data: &T) -> Result<Map<String, Value>, Error> {
        self.validate_with(data, CallOptions::new())
    }

    /// [`validate`](Self::validate) with per-call options.
    pub fn validate_with<T: Serialize>(
        &self,
        data: &T,
        call: CallOptions,
    ) -> Result<Map<String, Value>, Error> {
        let input = to_input(data)?;
        self.run(&input, Op::Validate, &call)
    }

    /// Validates (unless skipped) and serializes the input to its wire
    /// representation, applying output renames.
    pub fn serialize<T: Serialize>(&self, data: &T) -> Result<Map<String, Value>, Error> {
        self.serialize_with(data, CallOptions::new())
    }

    /// [`serialize`](Self::serialize) with per-call options.
    pub fn serialize_with<T: Serialize>(
        &self,
        data: &T,
        call: CallOptions,
    ) -> Result<Map<String, Value>, Error> {
        let input = to_input(data)?;
        self.run(&input, Op::Serialize, &call)
    }

    /// Validates (unless skipped) and deserializes the input into a new
    /// [`Instance`], keyed by declared field names.
    pub fn deserialize<T: Serialize>(&self, data: &T) -> Result<Instance, Error> {
        self.deserialize_with(data, CallOptions::new())
    }

    /// [`deserialize`](Self::deserialize) with per-call options.
    pub fn deserialize_with<T: Serialize>(
        &self,
        data: &T,
        call: CallOptions,
    ) -> Result<Instance, Error> {
        let input = to_input(data)?;
        let values = self.run(&input, Op::Deserialize, &call)?;
        Ok(Instance {
            schema_name: self.name.clone(),
            values,
        })
    }

    /// Serializes the input (unless skipped) and encodes it with the
    /// configured [`Encoder`](crate::Encoder).
    pub fn encode<T: Serialize>(&self, data: &T) -> Result<String, Error> {
        self.encode_with(data, CallOptions::new())
    }

    /// [`encode`](Self::encode) with per-call options.
    pub fn encode_with<T: Serialize>(&self, data: &T, call: CallOptions) -> Result<String, Error> {
        let input = to_input(data)?;
        let plain = if call.skip_serialization {
            if !call.skip_validation {
                self.run(&input, Op::Validate, &call)?;
            }
            Value::Object(input)
        } else {
            Value::Object(self.run(&input, Op::Serialize, &call)?)
        };
        self.options.encoder.encode(&plain)
    }

    /// Validates the input into a [`ValidationResult`], accumulating every
    /// field error on the failure side. Structural failures (bad input
    /// shape, unresolvable references) are folded in under the `schema` key.
    pub fn check<T: Serialize>(&self, data: &T) -> ValidationResult<Map<String, Value>> {
        match self.validate(data) {
            Ok(output) => Validation::Success(output),
            Err(Error::Validation(errors)) => Validation::Failure(errors),
            Err(other) => Validation::Failure(SchemaErrors::single(
                "schema",
                crate::error::FieldError::new("error", other.to_string()),
            )),
        }
    }

    /// Validates a batch in parallel, one [`ValidationResult`] per item.
    pub fn check_all<T: Serialize + Sync>(
        &self,
        items: &[T],
    ) -> Vec<ValidationResult<Map<String, Value>>> {
        items.par_iter().map(|item| self.check(item)).collect()
    }

    /// The error tree accumulated by the most recent call, if any.
    pub fn errors(&self) -> Option<SchemaErrors> {
        self.last_errors.read().clone()
    }

    /// The most recent error tree rendered through the configured
    /// [`ErrorFormatter`](crate::ErrorFormatter).
    pub fn errors_value(&self) -> Option<Value> {
        self.last_errors
            .read()
            .as_ref()
            .map(|errors| self.options.formatter.format(errors))
    }

    pub(crate) fn run(
        &self,
        data: &Map<String, Value>,
        op: Op,
        call: &CallOptions,
    ) -> Result<Map<String, Value>, Error> {
        *self.last_errors.write() = None;
        let outcome = process(self, data, op, call, 0)?;
        if !outcome.errors.is_empty() {
            let errors = SchemaErrors::from_map(outcome.errors);
            *self.last_errors.write() = Some(errors.clone());
            if self.options.raise_errors {
                return Err(Error::Validation(errors));
            }
        }
        Ok(outcome.output)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

// Schemas are shared across threads by the registry and check_all.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

/// Builds a [`Schema`] field by field.
pub struct SchemaBuilder {
    name: String,
    fields: IndexMap<String, Field>,
    options: SchemaOptions,
}

impl SchemaBuilder {
    /// Declares a field. Re-declaring a key replaces the previous field but
    /// keeps its position.
    pub fn field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    /// Copies every field declaration from another schema, before this
    /// builder's own declarations override them.
    pub fn include(mut self, other: &Schema) -> Self {
        for (key, field) in other.fields() {
            self.fields.entry(key.clone()).or_insert_with(|| field.clone());
        }
        self
    }

    /// Replaces the schema options.
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    /// Schema-wide default for accepting null values.
    pub fn allow_none(mut self, allowed: bool) -> Self {
        self.options.allow_none = allowed;
        self
    }

    /// See [`SchemaOptions::raise_errors`].
    pub fn raise_errors(mut self, raise: bool) -> Self {
        self.options.raise_errors = raise;
        self
    }

    /// Schema-wide default for emitting missing fields.
    pub fn output_missing(mut self, emit: bool) -> Self {
        self.options.output_missing = emit;
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
            options: self.options,
            last_errors: RwLock::new(None),
        }
    }
}

/// The product of a deserialize call: the schema's name plus the canonical
/// values keyed by declared field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    #[serde(skip)]
    schema_name: String,
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl Instance {
    /// The name of the schema that produced this instance.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Reads a field value by declared name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The full canonical value map.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consumes the instance, returning the value map.
    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}

/// Views any `Serialize` input as a key-value mapping.
pub(crate) fn to_input<T: Serialize>(data: &T) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Input(format!(
            "expected a mapping, got {}",
            value_type_name(&other)
        ))),
        Err(e) => Err(Error::Input(e.to_string())),
    }
}
