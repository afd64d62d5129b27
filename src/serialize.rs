//! Schema serialization helpers.
//!
//! Serde already provides JSON (and other) serialization for the
//! declarative types. This module centralizes convenience helpers, keeps
//! formatting stable, and makes the round-trip contract explicit: custom
//! verifiers are code, so deserialization re-binds them from the built-in
//! table by operation name.

use crate::error::FxpError;
use crate::schema::OpSchema;

/// Serializes a schema to pretty JSON.
pub fn to_json_pretty(schema: &OpSchema) -> Result<String, FxpError> {
    serde_json::to_string_pretty(schema)
        .map_err(|e| FxpError::internal(format!("serialize schema: {e}")))
}

/// Deserializes a schema from JSON and restores its custom verifier.
///
/// The reconstructed schema has the verification contract of the built-in
/// operation with the same name.
pub fn from_json(s: &str) -> Result<OpSchema, FxpError> {
    let mut schema = serde_json::from_str::<OpSchema>(s)
        .map_err(|e| FxpError::internal(format!("deserialize schema: {e}")))?;
    schema.rebind_verifier();
    Ok(schema)
}
