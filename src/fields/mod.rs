//! Field declarations: the typed unit of validation, serialization and
//! deserialization for a single value.
//!
//! A [`Field`] pairs a type-specific kind (string, integer, list, nested
//! schema, ...) with the declarative options shared by every kind: required,
//! default, allow-none, output-missing, rename/load aliases, tags, message
//! overrides, lifecycle hooks and custom validators.
//!
//! # Example
//!
//! ```rust
//! use trellis::{Field, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Person")
//!     .field("name", Field::string().required())
//!     .field("age", Field::integer().default_value(0))
//!     .build();
//!
//! let validated = schema.validate(&json!({"name": "harry"})).unwrap();
//! assert_eq!(validated["age"], json!(0));
//! ```

mod child;
mod hooks;
mod ident;
mod list;
mod nested;
mod one_of;
mod scalar;
mod temporal;

pub use hooks::{Hook, HookContext, ValidatorFn};

pub(crate) use hooks::{run_hooks, Hooks};
pub(crate) use nested::SchemaRef;

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::{FieldError, FieldFailure};
use crate::messages;
use crate::registry::SchemaRegistry;
use crate::schema::{CallOptions, Schema};

use scalar::StringOpts;

/// Tri-state option: explicitly set on the field, or inherited from the
/// schema configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Tri {
    Yes,
    No,
    #[default]
    Inherit,
}

impl Tri {
    pub fn resolve(self, inherited: bool) -> bool {
        match self {
            Tri::Yes => true,
            Tri::No => false,
            Tri::Inherit => inherited,
        }
    }

    fn explicit(value: bool) -> Self {
        if value {
            Tri::Yes
        } else {
            Tri::No
        }
    }
}

/// A default for a missing field: a static value or a producer called with
/// the schema and field at traversal time.
#[derive(Clone)]
pub(crate) enum FieldDefault {
    Value(Value),
    Producer(Arc<dyn Fn(&Schema, &Field) -> Value + Send + Sync>),
}

impl FieldDefault {
    pub fn produce(&self, schema: &Schema, field: &Field) -> Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Producer(producer) => producer(schema, field),
        }
    }
}

/// Element restrictions a nested field applies to its target schema:
/// the sub-schema call sees these as its exclude/whitelist/tags.
#[derive(Debug, Clone, Default)]
pub struct FieldView {
    /// Field keys removed from the sub-schema call.
    pub exclude: Vec<String>,
    /// If non-empty, the exact set of sub-schema keys considered.
    pub whitelist: Vec<String>,
    /// If non-empty, replaces the sub-schema's element set with the union
    /// of fields registered under these tags.
    pub tags: Vec<String>,
}

impl FieldView {
    pub(crate) fn sub_call(&self, parent: &CallOptions) -> CallOptions {
        let mut call = CallOptions::new();
        call.exclude = self.exclude.clone();
        call.whitelist = self.whitelist.clone();
        call.tags = self.tags.clone();
        call.halt_on_error = parent.halt_on_error;
        call.context = parent.context.clone();
        call
    }
}

/// The type-specific half of a field declaration.
#[derive(Clone)]
pub(crate) enum FieldKind {
    String(StringOpts),
    Integer { strict: bool },
    Float { strict: bool },
    Boolean,
    Dict,
    List { item: Box<Field> },
    Date,
    DateTime,
    Uuid,
    Anything,
    Nested { target: SchemaRef, view: FieldView },
    SelfRef { view: FieldView },
    OneOf { variants: Vec<Field> },
    Child { path: Vec<String>, inner: Box<Field> },
}

impl FieldKind {
    /// The kind label used for message catalog lookups.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String(_) => "string",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Float { .. } => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Dict => "dict",
            FieldKind::List { .. } => "list",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Uuid => "uuid",
            FieldKind::Anything => "anything",
            FieldKind::Nested { .. } => "nested",
            FieldKind::SelfRef { .. } => "self",
            FieldKind::OneOf { .. } => "one_of",
            FieldKind::Child { .. } => "child",
        }
    }
}

/// Per-field processing context handed to type-specific operations.
pub(crate) struct FieldContext<'a> {
    /// The schema running the current operation.
    pub schema: &'a Schema,
    /// The declared key of the field being processed.
    pub key: &'a str,
    /// The options of the current call.
    pub call: &'a CallOptions,
    /// Nesting depth of the current schema, for recursion guarding.
    pub depth: usize,
}

/// A declarative field: kind plus shared options.
///
/// Construct with the kind constructors (`Field::string()`,
/// `Field::integer()`, ...) and refine with the builder methods:
///
/// ```rust
/// use trellis::Field;
///
/// let username = Field::string()
///     .required()
///     .trim()
///     .allow_empty(false)
///     .rename("user_name");
/// ```
#[derive(Clone)]
pub struct Field {
    pub(crate) kind: FieldKind,
    pub(crate) name: Option<String>,
    pub(crate) load: Option<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<FieldDefault>,
    pub(crate) allow_none: Tri,
    pub(crate) output_missing: Tri,
    pub(crate) missing_output_value: Value,
    pub(crate) tags: Vec<String>,
    pub(crate) messages: IndexMap<String, String>,
    pub(crate) hooks: Hooks,
    pub(crate) validators: Vec<ValidatorFn>,
}

impl Field {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            name: None,
            load: None,
            required: false,
            default: None,
            allow_none: Tri::Inherit,
            output_missing: Tri::Inherit,
            missing_output_value: Value::Null,
            tags: Vec::new(),
            messages: IndexMap::new(),
            hooks: Hooks::default(),
            validators: Vec::new(),
        }
    }

    /// A string field. Exact type match, no implicit stringification.
    pub fn string() -> Self {
        Self::with_kind(FieldKind::String(StringOpts::new()))
    }

    /// An integer field. Rejects booleans; accepts whole floats unless
    /// [`strict`](Self::strict).
    pub fn integer() -> Self {
        Self::with_kind(FieldKind::Integer { strict: false })
    }

    /// A float field. Upcasts integers unless [`strict`](Self::strict).
    pub fn float() -> Self {
        Self::with_kind(FieldKind::Float { strict: false })
    }

    /// A boolean field. No truthy coercion.
    pub fn boolean() -> Self {
        Self::with_kind(FieldKind::Boolean)
    }

    /// A generic mapping field. Values pass through uninspected.
    pub fn dict() -> Self {
        Self::with_kind(FieldKind::Dict)
    }

    /// A homogeneous list validated against the given item field.
    pub fn list(item: Field) -> Self {
        Self::with_kind(FieldKind::List {
            item: Box::new(item),
        })
    }

    /// A calendar date, normalized to `YYYY-MM-DD`.
    pub fn date() -> Self {
        Self::with_kind(FieldKind::Date)
    }

    /// An ISO-8601 datetime, with or without an offset.
    pub fn datetime() -> Self {
        Self::with_kind(FieldKind::DateTime)
    }

    /// A UUID, canonicalized to lowercase hyphenated form.
    pub fn uuid() -> Self {
        Self::with_kind(FieldKind::Uuid)
    }

    /// A passthrough field that accepts any value.
    pub fn anything() -> Self {
        Self::with_kind(FieldKind::Anything)
    }

    /// A nested schema field with a directly-held target.
    pub fn nested(schema: Schema) -> Self {
        Self::with_kind(FieldKind::Nested {
            target: SchemaRef::resolved(schema),
            view: FieldView::default(),
        })
    }

    /// A nested schema field resolved by name through the registry on
    /// first use. Supports forward and circular references.
    pub fn nested_named(name: impl Into<String>) -> Self {
        Self::with_kind(FieldKind::Nested {
            target: SchemaRef::named(name),
            view: FieldView::default(),
        })
    }

    /// A nested field that delegates to the schema currently processing it.
    pub fn self_ref() -> Self {
        Self::with_kind(FieldKind::SelfRef {
            view: FieldView::default(),
        })
    }

    /// First-match dispatch over a fixed set of fields, in declared order.
    pub fn one_of(variants: Vec<Field>) -> Self {
        Self::with_kind(FieldKind::OneOf { variants })
    }

    /// Extracts the value at a dotted path in the input, then delegates to
    /// the inner field.
    pub fn child(path: &str, inner: Field) -> Self {
        Self::with_kind(FieldKind::Child {
            path: child::parse_path(path),
            inner: Box::new(inner),
        })
    }

    // --- shared options ---

    /// Marks the field required: missing input is a `required` error.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a static default used when the field is missing from input.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    /// Sets a default producer called with `(schema, field)` when the field
    /// is missing from input.
    pub fn default_with(
        mut self,
        producer: impl Fn(&Schema, &Field) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(FieldDefault::Producer(Arc::new(producer)));
        self
    }

    /// Explicitly allows (or forbids) null, overriding the schema setting.
    pub fn allow_none(mut self, allowed: bool) -> Self {
        self.allow_none = Tri::explicit(allowed);
        self
    }

    /// Explicitly emits (or suppresses) this field when missing from input,
    /// overriding the schema setting.
    pub fn output_missing(mut self, emit: bool) -> Self {
        self.output_missing = Tri::explicit(emit);
        self
    }

    /// The value emitted for a missing field when output-missing applies.
    /// Defaults to null.
    pub fn missing_output_value(mut self, value: impl Into<Value>) -> Self {
        self.missing_output_value = value.into();
        self
    }

    /// Renames the field on serialized output.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Accepts input under this alias during validate/deserialize.
    pub fn load(mut self, alias: impl Into<String>) -> Self {
        self.load = Some(alias.into());
        self
    }

    /// Registers the field under a tag for tag-scoped calls.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Registers the field under several tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Overrides the error message for a reason code.
    pub fn message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(code.into(), message.into());
        self
    }

    /// Adds a custom validator predicate; `false` marks the value invalid.
    pub fn validator(mut self, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validators.push(Arc::new(check));
        self
    }

    // --- lifecycle hooks ---

    /// Runs before type validation; may transform the raw value.
    pub fn pre_validate(mut self, hook: impl HookFn) -> Self {
        self.hooks.pre_validate.push(Arc::new(hook));
        self
    }

    /// Runs after type validation; may transform the canonical value.
    pub fn post_validate(mut self, hook: impl HookFn) -> Self {
        self.hooks.post_validate.push(Arc::new(hook));
        self
    }

    /// Runs before type serialization.
    pub fn pre_serialize(mut self, hook: impl HookFn) -> Self {
        self.hooks.pre_serialize.push(Arc::new(hook));
        self
    }

    /// Runs after type serialization.
    pub fn post_serialize(mut self, hook: impl HookFn) -> Self {
        self.hooks.post_serialize.push(Arc::new(hook));
        self
    }

    /// Runs before type deserialization.
    pub fn pre_deserialize(mut self, hook: impl HookFn) -> Self {
        self.hooks.pre_deserialize.push(Arc::new(hook));
        self
    }

    /// Runs after type deserialization.
    pub fn post_deserialize(mut self, hook: impl HookFn) -> Self {
        self.hooks.post_deserialize.push(Arc::new(hook));
        self
    }

    // --- kind-specific options (no-ops on other kinds) ---

    /// String: trim leading/trailing whitespace before further checks.
    pub fn trim(mut self) -> Self {
        if let FieldKind::String(opts) = &mut self.kind {
            opts.trim = true;
        }
        self
    }

    /// String: reject values that are empty after trimming.
    pub fn allow_empty(mut self, allowed: bool) -> Self {
        if let FieldKind::String(opts) = &mut self.kind {
            opts.allow_empty = allowed;
        }
        self
    }

    /// String: require the value to match a pattern.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        if let FieldKind::String(opts) = &mut self.kind {
            opts.pattern = Some(pattern);
        }
        self
    }

    /// Integer/Float: disable cross-type numeric coercion.
    pub fn strict(mut self) -> Self {
        match &mut self.kind {
            FieldKind::Integer { strict } | FieldKind::Float { strict } => *strict = true,
            _ => {}
        }
        self
    }

    /// Nested/SelfRef: restrict the sub-schema call to a view.
    pub fn view(mut self, sub_view: FieldView) -> Self {
        match &mut self.kind {
            FieldKind::Nested { view, .. } | FieldKind::SelfRef { view } => *view = sub_view,
            _ => {}
        }
        self
    }

    /// Nested: resolve the named target through a custom registry instead
    /// of the process-wide default.
    pub fn registry(mut self, custom: SchemaRegistry) -> Self {
        if let FieldKind::Nested { target, view } = self.kind {
            self.kind = FieldKind::Nested {
                target: target.with_registry(custom),
                view,
            };
        }
        self
    }

    // --- processing ---

    /// Builds a field error for a reason code, resolving per-field message
    /// overrides first, the kind catalog second, generic fallbacks last.
    pub(crate) fn error(&self, code: &str) -> FieldError {
        let message = self
            .messages
            .get(code)
            .cloned()
            .or_else(|| messages::default_message(self.kind.label(), code).map(str::to_string))
            .unwrap_or_else(|| {
                if code == "required" {
                    messages::REQUIRED.to_string()
                } else {
                    messages::INVALID.to_string()
                }
            });
        FieldError::new(code, message)
    }

    /// Type-specific validation: checks the value and returns its canonical
    /// form, then applies custom validator predicates.
    pub(crate) fn validate_in(
        &self,
        ctx: &FieldContext<'_>,
        value: &Value,
    ) -> Result<Value, FieldFailure> {
        let canonical = match &self.kind {
            FieldKind::String(opts) => scalar::validate_string(self, opts, value)?,
            FieldKind::Integer { strict } => scalar::validate_integer(self, *strict, value)?,
            FieldKind::Float { strict } => scalar::validate_float(self, *strict, value)?,
            FieldKind::Boolean => scalar::validate_boolean(self, value)?,
            FieldKind::Dict => scalar::validate_dict(self, value)?,
            FieldKind::List { item } => list::validate_list(self, item, ctx, value)?,
            FieldKind::Date => temporal::validate_date(self, value)?,
            FieldKind::DateTime => temporal::validate_datetime(self, value)?,
            FieldKind::Uuid => ident::validate_uuid(self, value)?,
            FieldKind::Anything => value.clone(),
            FieldKind::Nested { target, view } => {
                nested::validate_nested(self, target, view, ctx, value)?
            }
            FieldKind::SelfRef { view } => nested::validate_self(self, view, ctx, value)?,
            FieldKind::OneOf { variants } => one_of::validate_one_of(self, variants, ctx, value)?,
            FieldKind::Child { inner, .. } => inner.validate_in(ctx, value)?,
        };
        for check in &self.validators {
            if !check(&canonical) {
                return Err(self.error("invalid").into());
            }
        }
        Ok(canonical)
    }

    /// Type-specific serialization to the wire representation. Scalar
    /// mismatches are structural failures; composite kinds may surface
    /// sub-field errors the way validation does.
    pub(crate) fn serialize_in(
        &self,
        ctx: &FieldContext<'_>,
        value: &Value,
    ) -> Result<Value, FieldFailure> {
        let out = match &self.kind {
            FieldKind::String(opts) => scalar::serialize_string(opts, value)?,
            FieldKind::Integer { .. } => scalar::serialize_integer(value)?,
            FieldKind::Float { .. } => scalar::serialize_float(value)?,
            FieldKind::Boolean => scalar::serialize_boolean(value)?,
            FieldKind::Dict => scalar::serialize_dict(value)?,
            FieldKind::List { item } => list::serialize_list(self, item, ctx, value)?,
            FieldKind::Date => temporal::serialize_date(value)?,
            FieldKind::DateTime => temporal::serialize_datetime(value)?,
            FieldKind::Uuid => ident::serialize_uuid(value)?,
            FieldKind::Anything => value.clone(),
            FieldKind::Nested { target, view } => {
                nested::serialize_nested(self, target, view, ctx, value)?
            }
            FieldKind::SelfRef { view } => nested::serialize_self(self, view, ctx, value)?,
            FieldKind::OneOf { variants } => one_of::serialize_one_of(variants, ctx, value)?,
            FieldKind::Child { inner, .. } => inner.serialize_in(ctx, value)?,
        };
        Ok(out)
    }

    /// Type-specific deserialization to the canonical in-memory
    /// representation. Identity or a narrow coercion for scalar kinds.
    pub(crate) fn deserialize_in(
        &self,
        ctx: &FieldContext<'_>,
        value: &Value,
    ) -> Result<Value, FieldFailure> {
        let out = match &self.kind {
            FieldKind::String(opts) => scalar::serialize_string(opts, value)?,
            FieldKind::Integer { .. } => scalar::serialize_integer(value)?,
            FieldKind::Float { .. } => scalar::serialize_float(value)?,
            FieldKind::Boolean => scalar::serialize_boolean(value)?,
            FieldKind::Dict => scalar::serialize_dict(value)?,
            FieldKind::List { item } => list::deserialize_list(self, item, ctx, value)?,
            FieldKind::Date => temporal::serialize_date(value)?,
            FieldKind::DateTime => temporal::serialize_datetime(value)?,
            FieldKind::Uuid => ident::serialize_uuid(value)?,
            FieldKind::Anything => value.clone(),
            FieldKind::Nested { target, view } => {
                nested::deserialize_nested(self, target, view, ctx, value)?
            }
            FieldKind::SelfRef { view } => nested::deserialize_self(self, view, ctx, value)?,
            FieldKind::OneOf { variants } => one_of::deserialize_one_of(variants, ctx, value)?,
            FieldKind::Child { inner, .. } => inner.deserialize_in(ctx, value)?,
        };
        Ok(out)
    }

    /// The input key read during validate/deserialize: the load alias when
    /// present, else the declared key.
    pub(crate) fn input_key<'a>(&'a self, declared: &'a str) -> &'a str {
        self.load.as_deref().unwrap_or(declared)
    }

    /// The output key written during serialize: the rename when present,
    /// else the declared key.
    pub(crate) fn output_key<'a>(&'a self, declared: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(declared)
    }

    /// The explicit serialize rename, if one was set.
    pub(crate) fn serialized_key(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The dotted extraction path, for child fields.
    pub(crate) fn child_path(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Child { path, .. } => Some(path),
            _ => None,
        }
    }
}

pub(crate) use child::extract_path;
pub(crate) use scalar::value_type_name;

/// Bound alias for hook closures accepted by the builder methods.
pub trait HookFn:
    Fn(&HookContext<'_>, Value) -> Result<Value, FieldError> + Send + Sync + 'static
{
}

impl<F> HookFn for F where
    F: Fn(&HookContext<'_>, Value) -> Result<Value, FieldError> + Send + Sync + 'static
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_resolution() {
        assert!(Tri::Yes.resolve(false));
        assert!(!Tri::No.resolve(true));
        assert!(Tri::Inherit.resolve(true));
        assert!(!Tri::Inherit.resolve(false));
    }

    #[test]
    fn test_error_message_resolution() {
        let field = Field::string();
        assert_eq!(field.error("invalid").message, "Field is not a valid String");
        assert_eq!(field.error("required").message, "Required Field");
        assert_eq!(field.error("unknown_code").message, "Invalid Field");
    }

    #[test]
    fn test_error_message_override() {
        let field = Field::string().message("required", "name is mandatory");
        assert_eq!(field.error("required").message, "name is mandatory");
        assert_eq!(field.error("invalid").message, "Field is not a valid String");
    }

    #[test]
    fn test_keys() {
        let field = Field::string().rename("user_name").load("userName");
        assert_eq!(field.input_key("name"), "userName");
        assert_eq!(field.output_key("name"), "user_name");

        let plain = Field::string();
        assert_eq!(plain.input_key("name"), "name");
        assert_eq!(plain.output_key("name"), "name");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Field::string().kind.label(), "string");
        assert_eq!(Field::self_ref().kind.label(), "self");
        assert_eq!(Field::one_of(vec![]).kind.label(), "one_of");
    }
}
