//! # cgate-core — Foundational Types for the Contract Gate
//!
//! Defines the vocabulary shared by every pass of the contract gate: the
//! typed contract documents, canonical endpoint identifiers, schema
//! references, and the coded violation taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **One canonical endpoint key.** `EndpointId` reduces both the API
//!    specification's nested `paths → method` shape and the front end's flat
//!    proposals to `"METHOD path"`, so parity and compatibility checks are
//!    plain set membership.
//!
//! 2. **Format vs. resolution.** `parse_schema_ref()` returns `None` for a
//!    malformed reference; whether a well-formed reference resolves is a
//!    separate question answered against `SchemaPatchDocument::schema_ids()`.
//!
//! 3. **Single `ViolationCode` enum.** Every failure the gate can report is
//!    one variant; the bracketed code strings are a stable interface.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cgate-*` crates (this is the leaf of the DAG).
//! - No I/O.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod endpoint;
pub mod error;
pub mod identity;
pub mod schema_ref;

// Re-export primary types for ergonomic imports.
pub use document::{
    DbContractDocument, DocumentKind, EndpointProposal, FrontEndDocument, OpenApiDocument,
    SchemaPatchDocument, Screen, ScreenType,
};
pub use endpoint::{extract_api_endpoints, extract_front_end_endpoints, EndpointId, HttpMethod};
pub use error::{ContractViolation, CoreError, ViolationCode};
pub use identity::{ModuleName, SchemaId};
pub use schema_ref::{parse_schema_ref, SCHEMA_REF_SCHEME};
