//! # Contract Documents
//!
//! Typed records for the four documents a module bundle may carry.
//! Well-formedness is judged by the structural validators against the raw
//! JSON, so decoding is lenient: unknown fields are ignored, and a field
//! that is absent, null or of the wrong type takes its default. A
//! wrongly-typed array element becomes a default record. Only a document
//! whose root is not an object fails to decode.
//!
//! Proposal `method` and `path` values keep their raw JSON so that
//! [`EndpointProposal::method_text`] can render `null`, numbers and absent
//! values into the endpoint key instead of dropping the proposal.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::identity::SchemaId;

/// The document kinds stored in a module directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `openapi.json`
    OpenApi,
    /// `fe_details.json`
    FrontEnd,
    /// `zod_patch.json`
    SchemaPatch,
    /// `prisma_contract.json`
    DbContract,
}

impl DocumentKind {
    pub fn all() -> &'static [DocumentKind] {
        &[
            Self::OpenApi,
            Self::FrontEnd,
            Self::SchemaPatch,
            Self::DbContract,
        ]
    }

    /// File name of this document inside a module directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::OpenApi => "openapi.json",
            Self::FrontEnd => "fe_details.json",
            Self::SchemaPatch => "zod_patch.json",
            Self::DbContract => "prisma_contract.json",
        }
    }

    /// Name of the built-in structural schema for this document.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::OpenApi => "openapi.schema.json",
            Self::FrontEnd => "fe-details.schema.json",
            Self::SchemaPatch => "zod-patch.schema.json",
            Self::DbContract => "prisma-contract.schema.json",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Decodes a field, falling back to its default when the value has the
/// wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes an array element by element. A non-array decodes as empty and a
/// malformed element as its default.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// String coercion of a raw value as generators apply it when building a
/// key: absent is `undefined`, strings are verbatim, arrays join their
/// items with commas and objects collapse to `[object Object]`.
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_text(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// API specification of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// Specification version, e.g. `"3.0.3"`.
    #[serde(default, deserialize_with = "lenient")]
    pub openapi: Option<String>,
    /// Path pattern to operations object (method to opaque descriptor).
    #[serde(default, deserialize_with = "lenient")]
    pub paths: BTreeMap<String, Value>,
}

/// Screen categories a front-end detail document may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenType {
    Static,
    ApiDriven,
    InputDriven,
}

impl ScreenType {
    pub fn all() -> &'static [ScreenType] {
        &[Self::Static, Self::ApiDriven, Self::InputDriven]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::ApiDriven => "api_driven",
            Self::InputDriven => "input_driven",
        }
    }
}

impl FromStr for ScreenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown screen type: {s}"))
    }
}

/// UI screens of a module and the endpoints they propose to call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontEndDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub module_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub screens: Vec<Screen>,
}

impl FrontEndDocument {
    /// All endpoint proposals across all screens, in document order.
    pub fn proposals(&self) -> impl Iterator<Item = &EndpointProposal> {
        self.screens
            .iter()
            .flat_map(|screen| screen.endpoint_proposals.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    /// Raw screen type; see [`Screen::screen_type`].
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub endpoint_proposals: Vec<EndpointProposal>,
}

impl Screen {
    /// The screen type, if it is one of the recognized values.
    pub fn screen_type(&self) -> Option<ScreenType> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }
}

/// A single endpoint a screen intends to call.
///
/// Schema references are kept as raw JSON so that non-string values reach
/// the parity checker and are reported as malformed rather than rejected
/// during decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointProposal {
    #[serde(default, deserialize_with = "present")]
    pub method: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub path: Option<Value>,
    #[serde(default)]
    pub request_schema_ref: Option<Value>,
    #[serde(default)]
    pub response_schema_ref: Option<Value>,
    #[serde(default)]
    pub error_schema_ref: Option<Value>,
}

impl EndpointProposal {
    /// The method as it enters an endpoint key, before upper-casing.
    pub fn method_text(&self) -> String {
        coerce_text(self.method.as_ref())
    }

    /// The path as it enters an endpoint key.
    pub fn path_text(&self) -> String {
        coerce_text(self.path.as_ref())
    }

    /// The request, response and error references that are present and
    /// not null, in that order.
    pub fn schema_refs(&self) -> impl Iterator<Item = &Value> {
        [
            &self.request_schema_ref,
            &self.response_schema_ref,
            &self.error_schema_ref,
        ]
        .into_iter()
        .flatten()
        .filter(|v| !v.is_null())
    }
}

/// Validation schemas declared for a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPatchDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub module_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub schemas: Vec<SchemaEntry>,
}

impl SchemaPatchDocument {
    /// The registry of declared schema ids. Entries without a usable id
    /// are skipped.
    pub fn schema_ids(&self) -> std::collections::BTreeSet<SchemaId> {
        self.schemas.iter().filter_map(SchemaEntry::schema_id).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    #[serde(default, rename = "schemaId")]
    pub raw_schema_id: Option<Value>,
}

impl SchemaEntry {
    /// The declared id, if it is a non-empty string.
    pub fn schema_id(&self) -> Option<SchemaId> {
        self.raw_schema_id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(SchemaId::new)
    }
}

/// Database models traced back to source requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbContractDocument {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub models: Vec<Model>,
}

impl DbContractDocument {
    /// Total number of fields across all models.
    pub fn field_count(&self) -> usize {
        self.models.iter().map(|m| m.fields.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Opaque requirement references.
    #[serde(default, deserialize_with = "lenient_seq")]
    pub source_refs: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_names_are_fixed() {
        let names: Vec<_> = DocumentKind::all().iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "openapi.json",
                "fe_details.json",
                "zod_patch.json",
                "prisma_contract.json"
            ]
        );
    }

    #[test]
    fn openapi_decodes_with_unknown_fields() {
        let doc: OpenApiDocument = serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "users" },
            "paths": { "/api/users": { "get": {} } }
        }))
        .unwrap();
        assert_eq!(doc.openapi.as_deref(), Some("3.0.3"));
        assert_eq!(doc.paths.len(), 1);
    }

    #[test]
    fn front_end_defaults_missing_collections() {
        let doc: FrontEndDocument = serde_json::from_value(json!({
            "moduleId": "users",
            "screens": [{ "type": "static" }]
        }))
        .unwrap();
        assert_eq!(doc.screens.len(), 1);
        assert!(doc.screens[0].endpoint_proposals.is_empty());
        assert_eq!(doc.screens[0].screen_type(), Some(ScreenType::Static));
    }

    #[test]
    fn unknown_screen_type_is_none() {
        let screen = Screen {
            kind: Some("wizard".into()),
            endpoint_proposals: Vec::new(),
        };
        assert_eq!(screen.screen_type(), None);
    }

    #[test]
    fn schema_refs_skip_absent_and_null() {
        let proposal: EndpointProposal = serde_json::from_value(json!({
            "method": "GET",
            "path": "/api/users",
            "requestSchemaRef": null,
            "responseSchemaRef": "zod://UserList",
            "errorSchemaRef": 7
        }))
        .unwrap();
        let refs: Vec<&Value> = proposal.schema_refs().collect();
        assert_eq!(refs, vec![&json!("zod://UserList"), &json!(7)]);
    }

    #[test]
    fn schema_ids_skip_falsy_entries() {
        let doc: SchemaPatchDocument = serde_json::from_value(json!({
            "moduleId": "users",
            "schemas": [
                { "schemaId": "UserList" },
                { "schemaId": "" },
                { "schemaId": null },
                { "name": "anonymous" },
                { "schemaId": "UserDetail" }
            ]
        }))
        .unwrap();
        let ids: Vec<String> = doc.schema_ids().iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, vec!["UserDetail", "UserList"]);
    }

    #[test]
    fn wrongly_typed_fields_take_defaults() {
        let doc: FrontEndDocument = serde_json::from_value(json!({
            "moduleId": 7,
            "screens": [
                { "type": 3, "endpointProposals": "none" },
                "not-a-screen",
                { "type": "static", "endpointProposals": [{ "method": "GET", "path": "/api/x" }] }
            ]
        }))
        .unwrap();
        assert_eq!(doc.module_id, None);
        assert_eq!(doc.screens.len(), 3);
        assert_eq!(doc.screens[0], Screen::default());
        assert_eq!(doc.screens[1], Screen::default());
        assert_eq!(doc.proposals().count(), 1);

        let api: OpenApiDocument =
            serde_json::from_value(json!({ "openapi": 3.0, "paths": null })).unwrap();
        assert_eq!(api.openapi, None);
        assert!(api.paths.is_empty());

        let fe: FrontEndDocument = serde_json::from_value(json!({ "screens": null })).unwrap();
        assert!(fe.screens.is_empty());
    }

    #[test]
    fn non_object_root_still_fails() {
        assert!(serde_json::from_value::<OpenApiDocument>(json!([])).is_err());
        assert!(serde_json::from_value::<DbContractDocument>(json!("models")).is_err());
    }

    #[test]
    fn proposal_text_keeps_null_apart_from_absent() {
        let proposals: Vec<EndpointProposal> = serde_json::from_value(json!([
            { "method": null, "path": "/api/x" },
            { "path": "/api/x" },
            { "method": 7, "path": ["/api", null, 2] },
            { "method": { "verb": "GET" } }
        ]))
        .unwrap();
        let texts: Vec<(String, String)> = proposals
            .iter()
            .map(|p| (p.method_text(), p.path_text()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("null".to_string(), "/api/x".to_string()),
                ("undefined".to_string(), "/api/x".to_string()),
                ("7".to_string(), "/api,,2".to_string()),
                ("[object Object]".to_string(), "undefined".to_string()),
            ]
        );
    }

    #[test]
    fn db_contract_counts_fields() {
        let doc: DbContractDocument = serde_json::from_value(json!({
            "models": [
                { "model": "User", "fields": [
                    { "name": "id", "sourceRefs": ["REQ-1"] },
                    { "name": "email", "sourceRefs": ["REQ-2"] }
                ]},
                { "model": "Session", "fields": [
                    { "name": "token", "sourceRefs": ["REQ-7"] }
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(doc.models.len(), 2);
        assert_eq!(doc.field_count(), 3);
    }
}
