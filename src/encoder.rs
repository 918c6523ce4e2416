//! Pluggable encoding of serialized output.
//!
//! [`Schema::encode`](crate::Schema::encode) runs the normal serialize
//! traversal and then hands the plain structure to an [`Encoder`]. The
//! default [`JsonEncoder`] emits JSON text; alternative wire formats plug in
//! through [`SchemaOptions::encoder`](crate::SchemaOptions::encoder).

use serde_json::Value;

use crate::error::Error;

/// Encodes an already-serialized plain structure into a string.
pub trait Encoder: Send + Sync {
    /// Encodes the value, or fails with [`Error::Serialization`].
    fn encode(&self, value: &Value) -> Result<String, Error>;
}

/// The default encoder: compact JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, value: &Value) -> Result<String, Error> {
        serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_encoder() {
        let encoded = JsonEncoder.encode(&json!({"a": 1})).unwrap();
        assert_eq!(encoded, r#"{"a":1}"#);
    }
}
