//! Schema registry for named schema storage and reference resolution.
//!
//! The registry breaks forward and circular schema references: a nested
//! field may be declared against a name before the target schema exists,
//! and the name is resolved on first use. A process-wide default instance
//! is available through [`global()`]; a custom instance can be injected per
//! field via [`Field::registry`](crate::Field::registry).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::schema::Schema;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<Schema>>>>;

/// A thread-safe registry mapping names to schemas.
///
/// Registration overwrites: re-registering a name replaces the previous
/// schema, so test fixtures and module reloads can redefine entries.
///
/// # Example
///
/// ```rust
/// use trellis::{Field, Schema, SchemaRegistry};
///
/// let registry = SchemaRegistry::new();
/// registry.register(
///     "Actor",
///     Schema::builder("Actor")
///         .field("first_name", Field::string())
///         .build(),
/// );
///
/// assert!(registry.get("Actor").is_some());
/// assert!(registry.get("Director").is_none());
/// assert!(registry.expect("Director").is_err());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates a new empty schema registry.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a schema under the given name, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, schema: Schema) {
        let name = name.into();
        log::debug!("registering schema '{}'", name);
        self.schemas.write().insert(name, Arc::new(schema));
    }

    /// Retrieves a schema by name, or `None` if not registered.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Retrieves a schema by name, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the name is absent.
    pub fn expect(&self, name: &str) -> Result<Arc<Schema>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Removes a registered schema. Removing an unknown name is a no-op.
    pub fn remove(&self, name: &str) {
        log::debug!("removing schema '{}'", name);
        self.schemas.write().remove(name);
    }

    /// Clears all registered schemas.
    pub fn reset(&self) {
        self.schemas.write().clear();
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Returns true if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

/// Returns the process-wide default registry.
///
/// Named references created with [`Field::nested_named`](crate::Field::nested_named)
/// resolve against this instance unless a custom registry was injected on
/// the field.
pub fn global() -> &'static SchemaRegistry {
    static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
    GLOBAL.get_or_init(SchemaRegistry::new)
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The requested name has no registered schema.
    #[error("'{0}' was not found in the registry")]
    NotFound(String),
}
