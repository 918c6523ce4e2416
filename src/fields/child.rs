//! Child field kind: extracts a value from a dotted path before delegating.
//!
//! A child field flattens a denormalized nested input into a single logical
//! field: the dotted path is walked through nested mappings on the input,
//! the terminal value is extracted, and the inner field handles the rest.

use serde_json::{Map, Value};

/// Walks a dotted path through nested mappings. A missing segment or a
/// non-mapping intermediate yields `None`, which the traversal treats as a
/// missing field.
pub(crate) fn extract_path(data: &Map<String, Value>, path: &[String]) -> Option<Value> {
    let (terminal, parents) = path.split_last()?;
    let mut current = data;
    for segment in parents {
        current = current.get(segment)?.as_object()?;
    }
    current.get(terminal).cloned()
}

/// Splits a dotted path expression into segments.
pub(crate) fn parse_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}
