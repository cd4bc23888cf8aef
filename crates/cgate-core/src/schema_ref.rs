//! # Schema References
//!
//! Front-end endpoint proposals point at declared validation schemas with
//! strings of the form `zod://<schemaId>`. This module parses those strings
//! into [`SchemaId`]s.
//!
//! A reference that fails to parse is a *format* violation. A reference that
//! parses but names no declared schema is a *resolution* violation. Callers
//! report the two differently.

use serde_json::Value;

use crate::identity::SchemaId;

/// URI scheme prefix carried by every schema reference.
pub const SCHEMA_REF_SCHEME: &str = "zod://";

/// Parses a raw reference value into the schema id it names.
///
/// Returns `None` for non-string values and for strings without the
/// [`SCHEMA_REF_SCHEME`] prefix.
pub fn parse_schema_ref(value: &Value) -> Option<SchemaId> {
    value
        .as_str()
        .and_then(|s| s.strip_prefix(SCHEMA_REF_SCHEME))
        .map(SchemaId::new)
}
