//! Declarative schemas that validate, serialize and deserialize structured
//! data while accumulating every field error.
//!
//! A schema is an ordered table of typed field declarations. Each operation
//! walks the active fields once: validation checks every field and collects
//! all failures into one ordered error tree instead of stopping at the
//! first; serialization produces the wire representation (applying renames
//! and defaults); deserialization produces a canonical [`Instance`].
//!
//! # Quick Start
//!
//! ```rust
//! use trellis::{Field, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Actor")
//!     .field("first_name", Field::string().required())
//!     .field("last_name", Field::string().required())
//!     .field("age", Field::integer())
//!     .build();
//!
//! // every failing field is reported, not just the first
//! let err = schema.validate(&json!({"age": "old"})).unwrap_err();
//! let errors = err.as_validation().unwrap();
//! assert_eq!(errors.len(), 3);
//! assert_eq!(errors.get("age").unwrap().message, "Field is not a valid Integer");
//! ```
//!
//! # Nested Schemas
//!
//! Fields can delegate to other schemas, directly or by name through the
//! [`SchemaRegistry`] (which supports forward and circular references), and
//! error trees nest under the delegating field's key:
//!
//! ```rust
//! use trellis::{Field, Schema};
//! use serde_json::json;
//!
//! let actor = Schema::builder("Actor")
//!     .field("name", Field::string().required())
//!     .build();
//! let movie = Schema::builder("Movie")
//!     .field("title", Field::string().required())
//!     .field("cast", Field::list(Field::nested(actor)))
//!     .build();
//!
//! let err = movie
//!     .validate(&json!({"title": "Alien", "cast": [{"name": "Sigourney"}, {}]}))
//!     .unwrap_err();
//! let errors = err.as_validation().unwrap();
//! let cast = errors.get("cast").unwrap();
//! assert_eq!(cast.code, "invalid_item");
//! ```
//!
//! # Validation as a Value
//!
//! [`Schema::check`] returns a [`ValidationResult`] instead of a `Result`,
//! for composing schema checks with other accumulating validations;
//! [`Schema::check_all`] runs a batch in parallel.

pub mod encoder;
pub mod error;
pub mod fields;
pub mod registry;
pub mod schema;

mod messages;

pub use encoder::{Encoder, JsonEncoder};
pub use error::{Error, ErrorFormatter, FieldError, MapFormatter, SchemaErrors};
pub use fields::{Field, FieldView, Hook, HookContext, HookFn, ValidatorFn};
pub use registry::{global as global_registry, RegistryError, SchemaRegistry};
pub use schema::{
    CallOptions, Instance, PolySchema, PolySchemaBuilder, Schema, SchemaBuilder, SchemaOptions,
};

/// Validation outcome that accumulates field errors on the failure side.
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
