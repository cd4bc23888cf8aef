//! # Endpoint Identifiers and Extraction
//!
//! Parity and compatibility checks compare endpoints from documents that
//! express them differently: the API specification nests methods under a
//! path, while front-end proposals carry `method` and `path` side by side.
//! Both are reduced to the same canonical key, `"METHOD path"`, so the
//! checks become plain set membership.
//!
//! ## Normalization
//!
//! Only the method is normalized (upper-cased). Paths are compared
//! verbatim: `/api/users/{id}` and `/api/users/:id` are different
//! endpoints.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::{FrontEndDocument, OpenApiDocument};

/// HTTP methods collected from API specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn all() -> &'static [HttpMethod] {
        &[Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `get`, `GET` and `Get` all parse to [`HttpMethod::Get`].
impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| format!("unsupported HTTP method: {s}"))
    }
}

/// Canonical endpoint key: upper-cased method, a single space, the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    /// Builds the key from any method string. No verb allow-list is applied,
    /// so a misspelled method yields a key that simply never matches.
    pub fn new(method: &str, path: &str) -> Self {
        Self(format!("{} {path}", method.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<(HttpMethod, &str)> for EndpointId {
    fn from((method, path): (HttpMethod, &str)) -> Self {
        Self::new(method.as_str(), path)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collects every supported-verb endpoint declared by an API specification.
///
/// Path entries whose operations value is not an object are skipped, as are
/// method entries whose descriptor is not an object and keys that are not
/// one of the five supported verbs (`parameters`, `head`, `options`, ...).
pub fn extract_api_endpoints(doc: &OpenApiDocument) -> BTreeSet<EndpointId> {
    let mut endpoints = BTreeSet::new();
    for (path, operations) in &doc.paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for (method, descriptor) in operations {
            if !descriptor.is_object() {
                continue;
            }
            if let Ok(method) = method.parse::<HttpMethod>() {
                endpoints.insert(EndpointId::from((method, path.as_str())));
            }
        }
    }
    endpoints
}

/// Collects every endpoint proposed by the front end, in document order,
/// without duplicates.
pub fn extract_front_end_endpoints(doc: &FrontEndDocument) -> Vec<EndpointId> {
    let mut seen = HashSet::new();
    doc.proposals()
        .map(|proposal| EndpointId::new(&proposal.method_text(), &proposal.path_text()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn openapi(value: serde_json::Value) -> OpenApiDocument {
        serde_json::from_value(value).unwrap()
    }

    fn front_end(value: serde_json::Value) -> FrontEndDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn endpoint_id_uppercases_method_only() {
        let id = EndpointId::new("get", "/api/Users");
        assert_eq!(id.as_str(), "GET /api/Users");
    }

    #[test]
    fn api_extraction_normalizes_method_case() {
        for key in ["get", "GET", "Get"] {
            let doc = openapi(json!({
                "openapi": "3.0.0",
                "paths": { "/api/users": { key: {} } }
            }));
            let endpoints = extract_api_endpoints(&doc);
            assert_eq!(
                endpoints.into_iter().collect::<Vec<_>>(),
                vec![EndpointId::new("GET", "/api/users")]
            );
        }
    }

    #[test]
    fn api_extraction_ignores_unsupported_keys() {
        let doc = openapi(json!({
            "openapi": "3.1.0",
            "paths": {
                "/api/users": {
                    "get": {},
                    "head": {},
                    "options": {},
                    "parameters": [],
                    "post": { "summary": "create" }
                }
            }
        }));
        let endpoints = extract_api_endpoints(&doc);
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints.contains(&EndpointId::new("GET", "/api/users")));
        assert!(endpoints.contains(&EndpointId::new("POST", "/api/users")));
    }

    #[test]
    fn api_extraction_skips_non_object_entries() {
        let doc = openapi(json!({
            "openapi": "3.0.0",
            "paths": {
                "/api/a": null,
                "/api/b": "nonsense",
                "/api/c": { "get": null, "put": true, "delete": {} }
            }
        }));
        let endpoints = extract_api_endpoints(&doc);
        assert_eq!(
            endpoints.into_iter().collect::<Vec<_>>(),
            vec![EndpointId::new("DELETE", "/api/c")]
        );
    }

    #[test]
    fn path_templates_are_not_normalized() {
        assert_ne!(
            EndpointId::new("GET", "/api/users/{id}"),
            EndpointId::new("GET", "/api/users/:id")
        );
    }

    #[test]
    fn front_end_extraction_keeps_document_order_and_dedups() {
        let doc = front_end(json!({
            "moduleId": "users",
            "screens": [
                {
                    "type": "api_driven",
                    "endpointProposals": [
                        { "method": "post", "path": "/api/users" },
                        { "method": "GET", "path": "/api/users" }
                    ]
                },
                {
                    "type": "static",
                    "endpointProposals": [
                        { "method": "Post", "path": "/api/users" },
                        { "method": "fetch", "path": "/api/users" }
                    ]
                }
            ]
        }));
        let endpoints: Vec<String> = extract_front_end_endpoints(&doc)
            .into_iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            endpoints,
            vec!["POST /api/users", "GET /api/users", "FETCH /api/users"]
        );
    }

    #[test]
    fn front_end_extraction_renders_missing_and_null_methods() {
        let doc = front_end(json!({
            "moduleId": "users",
            "screens": [{
                "type": "api_driven",
                "endpointProposals": [
                    { "path": "/api/x" },
                    { "method": null, "path": "/api/x" }
                ]
            }]
        }));
        let endpoints: Vec<String> = extract_front_end_endpoints(&doc)
            .into_iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(endpoints, vec!["UNDEFINED /api/x", "NULL /api/x"]);
    }

    proptest! {
        #[test]
        fn method_parse_is_case_insensitive(
            idx in 0usize..5,
            mask in proptest::collection::vec(any::<bool>(), 6),
        ) {
            let method = HttpMethod::all()[idx];
            let mixed: String = method
                .as_str()
                .chars()
                .zip(mask.iter().cycle())
                .map(|(c, lower)| if *lower { c.to_ascii_lowercase() } else { c })
                .collect();
            prop_assert_eq!(mixed.parse::<HttpMethod>().unwrap(), method);
            prop_assert_eq!(
                EndpointId::new(&mixed, "/api/x"),
                EndpointId::from((method, "/api/x"))
            );
        }

        #[test]
        fn endpoint_key_keeps_path_verbatim(path in "/api/[a-zA-Z0-9{}:/_-]{0,24}") {
            let id = EndpointId::new("patch", &path);
            prop_assert_eq!(id.as_str(), format!("PATCH {path}"));
        }
    }
}
