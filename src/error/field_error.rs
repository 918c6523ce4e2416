//! Field error types.
//!
//! This module provides [`FieldError`] for a single per-field validation
//! failure (with optional nested child errors for composite fields) and
//! [`SchemaErrors`] for the keyed, ordered error map accumulated by one
//! schema call.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use stillwater::prelude::Semigroup;

/// A single validation failure for one field.
///
/// A `FieldError` carries a machine-readable reason code (e.g. `required`,
/// `invalid`, `invalid_item`), a human-readable message, and, for composite
/// fields like lists and nested schemas, an optional map of child errors
/// keyed by list index or sub-field name.
///
/// # Example
///
/// ```rust
/// use trellis::FieldError;
///
/// let error = FieldError::new("invalid", "Field is not a valid Integer");
/// assert_eq!(error.code, "invalid");
/// assert!(error.errors.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Machine-readable reason code (e.g. `required`, `invalid_item`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Nested child errors, keyed by sub-field name or list index.
    pub errors: Option<IndexMap<String, FieldError>>,
}

impl FieldError {
    /// Creates a new field error with the given reason code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// Attaches a map of child errors and returns self for chaining.
    pub fn with_children(mut self, children: IndexMap<String, FieldError>) -> Self {
        self.errors = Some(children);
        self
    }

    /// Renders this error as the public JSON shape: `{"msg", "errors"?}`.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("msg".to_string(), json!(self.message));
        if let Some(children) = &self.errors {
            let mut nested = Map::new();
            for (key, child) in children {
                nested.insert(key.clone(), child.to_value());
            }
            out.insert("errors".to_string(), Value::Object(nested));
        }
        Value::Object(out)
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(children) = &self.errors {
            let keys: Vec<&str> = children.keys().map(|k| k.as_str()).collect();
            write!(f, " (at: {})", keys.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// A non-empty, ordered map of field key to [`FieldError`].
///
/// `SchemaErrors` is the error side of a schema call. It preserves field
/// declaration order, so error reporting is deterministic, and it is
/// guaranteed non-empty by construction.
///
/// # Combining Errors
///
/// `SchemaErrors` implements `Semigroup`, so errors from independent checks
/// can be combined; on a key collision the earlier error wins:
///
/// ```rust
/// use trellis::{FieldError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let a = SchemaErrors::single("name", FieldError::new("required", "Required Field"));
/// let b = SchemaErrors::single("age", FieldError::new("invalid", "Invalid Field"));
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(IndexMap<String, FieldError>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single keyed error.
    pub fn single(key: impl Into<String>, error: FieldError) -> Self {
        let mut map = IndexMap::new();
        map.insert(key.into(), error);
        Self(map)
    }

    /// Creates a `SchemaErrors` from a keyed error map.
    ///
    /// # Panics
    ///
    /// Panics if the map is empty. Use this when you are certain at least
    /// one error was recorded.
    pub fn from_map(errors: IndexMap<String, FieldError>) -> Self {
        assert!(
            !errors.is_empty(),
            "SchemaErrors requires at least one error"
        );
        Self(errors)
    }

    /// Returns the number of errored fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false since this collection is guaranteed non-empty.
    ///
    /// This method exists for API consistency but always returns false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the error recorded for a field key, if any.
    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.0.get(key)
    }

    /// Returns an iterator over `(field key, error)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldError)> {
        self.0.iter()
    }

    /// Returns all field keys whose error carries the given reason code.
    pub fn with_code(&self, code: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, e)| e.code == code)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Returns the first `(key, error)` pair in field order.
    pub fn first(&self) -> (&String, &FieldError) {
        self.0.first().expect("SchemaErrors is never empty")
    }

    /// Returns a reference to the underlying keyed map.
    pub fn as_map(&self) -> &IndexMap<String, FieldError> {
        &self.0
    }

    /// Consumes self, returning the underlying keyed map.
    pub fn into_map(self) -> IndexMap<String, FieldError> {
        self.0
    }

    /// Renders the whole error set as the public JSON shape:
    /// `{key: {"msg", "errors"?}}`.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        for (key, error) in &self.0 {
            out.insert(key.clone(), error.to_value());
        }
        Value::Object(out)
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        let mut map = self.0;
        for (key, error) in other.0 {
            map.entry(key).or_insert(error);
        }
        SchemaErrors(map)
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, (key, error)) in self.iter().enumerate() {
            writeln!(f, "  {}. {}: {}", i + 1, key, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = (String, FieldError);
    type IntoIter = indexmap::map::IntoIter<String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// SchemaErrors is Send + Sync since it only contains owned Strings and
// FieldErrors. Assert it stays that way if the types change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_creation() {
        let error = FieldError::new("required", "Required Field");
        assert_eq!(error.code, "required");
        assert_eq!(error.message, "Required Field");
        assert!(error.errors.is_none());
    }

    #[test]
    fn test_field_error_children() {
        let mut children = IndexMap::new();
        children.insert("0".to_string(), FieldError::new("invalid", "Invalid Field"));
        let error =
            FieldError::new("invalid_item", "Field item is invalid").with_children(children);

        let value = error.to_value();
        assert_eq!(value["msg"], json!("Field item is invalid"));
        assert_eq!(value["errors"]["0"]["msg"], json!("Invalid Field"));
    }

    #[test]
    fn test_schema_errors_single() {
        let errors = SchemaErrors::single("name", FieldError::new("required", "Required Field"));
        assert_eq!(errors.len(), 1);
        assert!(!errors.is_empty());
        assert_eq!(errors.first().0, "name");
    }

    #[test]
    fn test_schema_errors_combine() {
        let a = SchemaErrors::single("a", FieldError::new("required", "Required Field"));
        let b = SchemaErrors::single("b", FieldError::new("invalid", "Invalid Field"));
        let combined = a.combine(b);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.get("a").unwrap().code, "required");
        assert_eq!(combined.get("b").unwrap().code, "invalid");
    }

    #[test]
    fn test_schema_errors_combine_keeps_first_on_collision() {
        let a = SchemaErrors::single("a", FieldError::new("required", "Required Field"));
        let b = SchemaErrors::single("a", FieldError::new("invalid", "Invalid Field"));
        let combined = a.combine(b);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined.get("a").unwrap().code, "required");
    }

    #[test]
    fn test_schema_errors_with_code() {
        let mut map = IndexMap::new();
        map.insert(
            "a".to_string(),
            FieldError::new("required", "Required Field"),
        );
        map.insert("b".to_string(), FieldError::new("invalid", "Invalid Field"));
        map.insert(
            "c".to_string(),
            FieldError::new("required", "Required Field"),
        );
        let errors = SchemaErrors::from_map(map);

        assert_eq!(errors.with_code("required"), vec!["a", "c"]);
        assert_eq!(errors.with_code("invalid"), vec!["b"]);
    }

    #[test]
    fn test_schema_errors_to_value() {
        let errors = SchemaErrors::single("name", FieldError::new("required", "Required Field"));
        assert_eq!(
            errors.to_value(),
            json!({"name": {"msg": "Required Field"}})
        );
    }

    #[test]
    #[should_panic(expected = "at least one error")]
    fn test_schema_errors_from_empty_map_panics() {
        SchemaErrors::from_map(IndexMap::new());
    }

    #[test]
    fn test_semigroup_associativity() {
        let e1 = SchemaErrors::single("a", FieldError::new("invalid", "1"));
        let e2 = SchemaErrors::single("b", FieldError::new("invalid", "2"));
        let e3 = SchemaErrors::single("c", FieldError::new("invalid", "3"));

        let left = e1.clone().combine(e2.clone()).combine(e3.clone());
        let right = e1.combine(e2.combine(e3));
        assert_eq!(left, right);
    }
}
