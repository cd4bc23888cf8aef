//! # cgate-checks — The Contract Gate Passes
//!
//! Runs the consistency checks over a directory of module contract
//! bundles. Each pass is independent, read-only, and fail-fast: it returns
//! either a summary or the first [`ContractViolation`] it encounters.
//!
//! ## Passes
//!
//! - [`structural`]: per-document well-formedness (`OPENAPI_INVALID`,
//!   `FE_SCHEMA_INVALID`, `DB_TRACEABILITY_FAIL`).
//! - [`parity`]: front-end endpoints and schema references resolve
//!   against the API specification and schema patch
//!   (`ENDPOINT_PARITY_FAIL`, `SCHEMA_REF_PARITY_FAIL`).
//! - [`breaking`]: no endpoint of the accepted baseline has been removed
//!   (`BREAKING_CHANGE_UNAPPROVED`).
//!
//! Documents that cannot be parsed are reported as `DOCUMENT_PARSE_ERROR`
//! by every pass.
//!
//! ## Crate Policy
//!
//! - Never writes to the module or baseline roots.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod breaking;
pub mod inventory;
pub mod parity;
pub mod repository;
pub mod runner;
pub mod structural;

pub use cgate_core::{ContractViolation, ViolationCode};
pub use inventory::{inventory, ModuleInventory};
pub use repository::{ModuleRepository, RepositoryError};
pub use runner::{CheckKind, CheckReport, ContractGate, PassSummary};
