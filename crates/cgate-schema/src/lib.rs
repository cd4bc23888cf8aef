//! # cgate-schema — Structural Rules for Contract Documents
//!
//! Each contract document kind has a JSON Schema describing what
//! "well-formed" means for it: the API specification's version and path
//! prefix, the front end's screen type enum, the schema patch's non-empty
//! declarations, the database contract's traceability links. The
//! [`validate`] module compiles and evaluates those schemas.
//!
//! ## Crate Policy
//!
//! - Depends only on `cgate-core` internally.
//! - The schemas under `schemas/` are compiled in; a schema directory may
//!   replace individual schemas at runtime.
//! - Validation never mutates a document.

pub mod validate;

pub use validate::{
    SchemaSource, SchemaValidationError, SchemaValidator, ValidationViolations, Violation,
};
