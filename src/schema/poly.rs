//! Polymorphic schema dispatch.
//!
//! A [`PolySchema`] routes every operation to a concrete schema chosen by
//! the value of a discriminator key in the input. A missing key or an
//! unmapped value is a structural failure, not a field error: the input
//! cannot be classified at all, so there is no schema to accumulate errors
//! against.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

use super::traversal::Op;
use super::{to_input, CallOptions, Instance, Schema};

/// A discriminator-dispatched family of schemas.
///
/// # Example
///
/// ```rust
/// use trellis::{Field, PolySchema, Schema};
/// use serde_json::json;
///
/// let poly = PolySchema::builder("Media", "media_type")
///     .variant(
///         "movie",
///         Schema::builder("Movie")
///             .field("media_type", Field::string().required())
///             .field("title", Field::string().required())
///             .build(),
///     )
///     .variant(
///         "album",
///         Schema::builder("Album")
///             .field("media_type", Field::string().required())
///             .field("artist", Field::string().required())
///             .build(),
///     )
///     .build();
///
/// let out = poly
///     .validate(&json!({"media_type": "movie", "title": "Alien"}))
///     .unwrap();
/// assert_eq!(out["title"], json!("Alien"));
/// ```
pub struct PolySchema {
    name: String,
    key: String,
    variants: IndexMap<String, Arc<Schema>>,
}

impl PolySchema {
    /// Starts building a polymorphic schema dispatching on `key`.
    pub fn builder(name: impl Into<String>, key: impl Into<String>) -> PolySchemaBuilder {
        PolySchemaBuilder {
            name: name.into(),
            key: key.into(),
            base: None,
            variants: IndexMap::new(),
        }
    }

    /// The family name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The discriminator key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolves the concrete schema for an input.
    ///
    /// # Errors
    ///
    /// [`Error::PolyKey`] when the discriminator is absent,
    /// [`Error::PolyMapping`] when its value has no registered variant.
    pub fn dispatch(&self, data: &Map<String, Value>) -> Result<&Arc<Schema>, Error> {
        let tag_value = data
            .get(&self.key)
            .ok_or_else(|| Error::PolyKey(self.key.clone()))?;
        let tag = match tag_value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        log::debug!("dispatching '{}' on {}='{}'", self.name, self.key, tag);
        self.variants.get(&tag).ok_or_else(|| Error::PolyMapping {
            key: self.key.clone(),
            value: tag,
        })
    }

    /// Validates through the dispatched variant.
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
        let schema = self.dispatch(&input)?;
        schema.run(&input, Op::Validate, &call)
    }

    /// Serializes through the dispatched variant.
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
        let schema = self.dispatch(&input)?;
        schema.run(&input, Op::Serialize, &call)
    }

    /// Deserializes through the dispatched variant; the instance carries
    /// the concrete variant's schema name.
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
        let schema = self.dispatch(&input)?;
        schema.deserialize_with(&Value::Object(input), call)
    }

    /// Encodes through the dispatched variant.
    pub fn encode<T: Serialize>(&self, data: &T) -> Result<String, Error> {
        self.encode_with(data, CallOptions::new())
    }

    /// [`encode`](Self::encode) with per-call options.
    pub fn encode_with<T: Serialize>(&self, data: &T, call: CallOptions) -> Result<String, Error> {
        let input = to_input(data)?;
        let schema = self.dispatch(&input)?;
        schema.encode_with(&Value::Object(input), call)
    }
}

impl std::fmt::Debug for PolySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolySchema")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("variants", &self.variants.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds a [`PolySchema`] variant by variant.
pub struct PolySchemaBuilder {
    name: String,
    key: String,
    base: Option<Schema>,
    variants: IndexMap<String, Schema>,
}

impl PolySchemaBuilder {
    /// Declares fields shared by every variant (the discriminator itself
    /// usually lives here). Base fields are merged in front of each
    /// variant's own; a variant re-declaring a key overrides the base.
    pub fn base(mut self, schema: Schema) -> Self {
        self.base = Some(schema);
        self
    }

    /// Maps a discriminator value to a concrete schema.
    pub fn variant(mut self, tag: impl Into<String>, schema: Schema) -> Self {
        self.variants.insert(tag.into(), schema);
        self
    }

    pub fn build(self) -> PolySchema {
        let base = self.base;
        let variants = self
            .variants
            .into_iter()
            .map(|(tag, variant)| {
                let merged = match &base {
                    Some(base) => {
                        let mut builder = Schema::builder(variant.name())
                            .options(variant.options().clone())
                            .include(base);
                        // variant declarations override base ones in place
                        for (key, field) in variant.fields() {
                            builder = builder.field(key.clone(), field.clone());
                        }
                        builder.build()
                    }
                    None => variant,
                };
                (tag, Arc::new(merged))
            })
            .collect();
        PolySchema {
            name: self.name,
            key: self.key,
            variants,
        }
    }
}
