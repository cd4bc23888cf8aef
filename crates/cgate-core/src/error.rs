//! # Violation Codes — The Gate's Failure Taxonomy
//!
//! Every check in the contract gate ends in exactly one of two ways: a pass,
//! or a single [`ContractViolation`] carrying a [`ViolationCode`] and a
//! human-readable message. There is no warning tier.
//!
//! ## Wire Format
//!
//! A violation renders as `[<CODE>] <message>`. CI tooling greps for the
//! bracketed code, so the code strings are part of the public interface and
//! must never be renamed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coded failure categories emitted by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// The module API specification is structurally invalid.
    OpenapiInvalid,
    /// The front-end detail document or its schema patch is structurally invalid.
    FeSchemaInvalid,
    /// A database model field cannot be traced to a source requirement.
    DbTraceabilityFail,
    /// The front end calls an endpoint the API specification does not declare.
    EndpointParityFail,
    /// A front-end schema reference is malformed or names an undeclared schema.
    SchemaRefParityFail,
    /// An endpoint present in the baseline was removed.
    BreakingChangeUnapproved,
    /// A contract document could not be read or decoded.
    DocumentParseError,
}

impl ViolationCode {
    /// Returns every code in declaration order.
    pub fn all() -> &'static [ViolationCode] {
        &[
            Self::OpenapiInvalid,
            Self::FeSchemaInvalid,
            Self::DbTraceabilityFail,
            Self::EndpointParityFail,
            Self::SchemaRefParityFail,
            Self::BreakingChangeUnapproved,
            Self::DocumentParseError,
        ]
    }

    /// The code as it appears between brackets in gate output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenapiInvalid => "OPENAPI_INVALID",
            Self::FeSchemaInvalid => "FE_SCHEMA_INVALID",
            Self::DbTraceabilityFail => "DB_TRACEABILITY_FAIL",
            Self::EndpointParityFail => "ENDPOINT_PARITY_FAIL",
            Self::SchemaRefParityFail => "SCHEMA_REF_PARITY_FAIL",
            Self::BreakingChangeUnapproved => "BREAKING_CHANGE_UNAPPROVED",
            Self::DocumentParseError => "DOCUMENT_PARSE_ERROR",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| CoreError::UnknownViolationCode(s.to_string()))
    }
}

/// A single fatal finding. The first one encountered halts the check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct ContractViolation {
    /// Failure category.
    pub code: ViolationCode,
    /// Human-readable detail naming the offending module, file, or endpoint.
    pub message: String,
}

impl ContractViolation {
    pub fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors raised while constructing core types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A module name was empty or contained a path separator.
    #[error("invalid module name: {0:?}")]
    InvalidModuleName(String),

    /// A string did not match any known violation code.
    #[error("unknown violation code: {0}")]
    UnknownViolationCode(String),
}
