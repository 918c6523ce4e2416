//! Error types for validation, serialization and dispatch failures.
//!
//! Field-level failures are accumulated into [`SchemaErrors`] and surface
//! once per call; structural failures (registry misses, serializer failures,
//! polymorphic dispatch misses) propagate immediately as [`Error`] variants.

mod field_error;
mod handler;

pub use field_error::{FieldError, SchemaErrors};
pub use handler::{ErrorFormatter, MapFormatter};

use crate::registry::RegistryError;

/// Errors produced by schema operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more fields failed validation. Carries the accumulated,
    /// ordered error map for the call.
    #[error("{0}")]
    Validation(SchemaErrors),

    /// A serializer could not produce a wire value for an input that was
    /// not (or could not be) validated first. Signals a configuration or
    /// programming error rather than bad data.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A named schema reference could not be resolved.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The polymorphic discriminator key was absent from the input.
    #[error("polymorphic key '{0}' missing from input")]
    PolyKey(String),

    /// The discriminator value had no registered concrete schema.
    #[error("no polymorphic mapping found for '{value}' on key '{key}'")]
    PolyMapping {
        /// The discriminator key that was read.
        key: String,
        /// The unmatched discriminator value.
        value: String,
    },

    /// The input data could not be viewed as a key-value mapping.
    #[error("invalid input: {0}")]
    Input(String),
}

impl Error {
    /// Returns the accumulated field errors if this is a validation failure.
    pub fn as_validation(&self) -> Option<&SchemaErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Internal per-field failure channel.
///
/// `Invalid` failures are recorded against the field key and recovered
/// locally; `Fatal` failures abort the whole traversal.
#[derive(Debug)]
pub(crate) enum FieldFailure {
    Invalid(FieldError),
    Fatal(Error),
}

impl From<FieldError> for FieldFailure {
    fn from(error: FieldError) -> Self {
        FieldFailure::Invalid(error)
    }
}

impl From<Error> for FieldFailure {
    fn from(error: Error) -> Self {
        FieldFailure::Fatal(error)
    }
}

impl From<RegistryError> for FieldFailure {
    fn from(error: RegistryError) -> Self {
        FieldFailure::Fatal(Error::Registry(error))
    }
}
