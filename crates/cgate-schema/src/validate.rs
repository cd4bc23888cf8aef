//! # Structural Validation
//!
//! Evaluates contract documents against JSON Schema definitions
//! (Draft 2020-12). Each [`DocumentKind`] has one schema; the built-in set
//! is compiled into the binary from the repository's `schemas/` directory,
//! and a directory of replacement schemas may be loaded instead.
//!
//! ## Reporting
//!
//! Validation yields every violation the `jsonschema` crate finds, each
//! with the JSON Pointer of the offending instance. The gate itself is
//! fail-fast and reports only [`ValidationViolations::primary`]: faults in
//! a document's top-level fields win over nested ones, and top-level
//! fields are taken in the order the schema's `required` list names them.
//! `jsonschema` evaluates keywords in key order, so emission order alone
//! would put `properties` faults ahead of a missing required field.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use cgate_core::DocumentKind;
use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Built-in schemas, keyed by file name.
const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    (
        "openapi.schema.json",
        include_str!("../../../schemas/openapi.schema.json"),
    ),
    (
        "fe-details.schema.json",
        include_str!("../../../schemas/fe-details.schema.json"),
    ),
    (
        "zod-patch.schema.json",
        include_str!("../../../schemas/zod-patch.schema.json"),
    ),
    (
        "prisma-contract.schema.json",
        include_str!("../../../schemas/prisma-contract.schema.json"),
    ),
];

/// Error during structural validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading a schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// Top-level document field the violation concerns, if any.
    pub field: Option<String>,
}

impl Violation {
    /// True for violations below the document's top-level fields.
    pub fn is_nested(&self) -> bool {
        self.instance_path.split('/').skip(1).count() > 1
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations. Never empty when produced by
/// [`SchemaValidator::validate_document`].
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
    /// The schema's top-level `required` list, in declaration order.
    field_order: Vec<String>,
}

impl ValidationViolations {
    /// The violation a fail-fast gate reports. Top-level faults come
    /// before nested ones, then follow the schema's `required` order, then
    /// evaluation order.
    pub fn primary(&self) -> Option<&Violation> {
        self.violations
            .iter()
            .min_by_key(|v| (v.is_nested(), self.field_rank(v)))
    }

    fn field_rank(&self, violation: &Violation) -> usize {
        violation
            .field
            .as_ref()
            .and_then(|field| self.field_order.iter().position(|f| f == field))
            .unwrap_or(self.field_order.len())
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// A structural validator backed by the `jsonschema` crate.
///
/// Holds one parsed schema per document kind and compiles a validator on
/// demand. `Send + Sync`; schema loading happens once at construction.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    /// Where the schemas came from, for diagnostics.
    source: SchemaSource,
    /// Map from schema filename (e.g., "openapi.schema.json") to parsed JSON value.
    schemas: HashMap<String, Value>,
}

/// Origin of a validator's schema set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Builtin,
    Directory(PathBuf),
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("built-in schemas"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

impl SchemaValidator {
    /// Create a validator over the schemas compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if a built-in schema
    /// is not valid JSON.
    pub fn builtin() -> Result<Self, SchemaValidationError> {
        let mut schemas = HashMap::new();
        for (name, content) in BUILTIN_SCHEMAS {
            let value: Value = serde_json::from_str(content).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: (*name).to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?;
            schemas.insert((*name).to_string(), value);
        }
        Ok(Self {
            source: SchemaSource::Builtin,
            schemas,
        })
    }

    /// Create a validator by loading schemas from a directory.
    ///
    /// Reads every `*.schema.json` file in `schema_dir`. A schema the
    /// directory does not provide falls back to the built-in one, so a
    /// directory may override a single document kind.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the directory
    /// cannot be read or any schema file is not valid JSON.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut validator = Self::builtin()?;

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".schema.json") {
                    let content = std::fs::read_to_string(&path)?;
                    let value: Value = serde_json::from_str(&content).map_err(|e| {
                        SchemaValidationError::SchemaLoadError {
                            schema_name: name.to_string(),
                            reason: format!("invalid JSON: {e}"),
                        }
                    })?;
                    validator.schemas.insert(name.to_string(), value);
                }
            }
        }

        validator.source = SchemaSource::Directory(schema_dir);
        Ok(validator)
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build a compiled `Validator` for a specific schema by filename.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the schema is not found.
    /// Returns `SchemaValidationError::ValidatorBuildError` if the validator cannot be compiled.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaValidationError> {
        let schema_value = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: format!("schema not found in {}", self.source),
            }
        })?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.build(schema_value)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Compiles the schema of every document kind, surfacing a broken
    /// schema directory before any document is checked.
    pub fn compile_all(&self) -> Result<(), SchemaValidationError> {
        for kind in DocumentKind::all() {
            self.build_validator(kind.schema_name())?;
        }
        Ok(())
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with structured
    /// violation details if the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema_name)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| {
                let instance_path = e.instance_path.to_string();
                Violation {
                    field: top_level_field(&e.kind, &instance_path),
                    schema_path: e.schema_path.to_string(),
                    message: e.to_string(),
                    instance_path,
                }
            })
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        let field_order = self
            .schemas
            .get(schema_name)
            .and_then(|schema| schema.get("required"))
            .and_then(Value::as_array)
            .map(|required| {
                required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Err(SchemaValidationError::ValidationFailed {
            schema_name: schema_name.to_string(),
            violations: ValidationViolations {
                violations: errors,
                field_order,
            },
        })
    }

    /// Validate a document against the schema registered for its kind.
    pub fn validate_kind(
        &self,
        kind: DocumentKind,
        instance: &Value,
    ) -> Result<(), SchemaValidationError> {
        self.validate_document(instance, kind.schema_name())
    }
}

/// The top-level field an error sits under. Errors on the document itself
/// name a field only when it is a missing required property.
fn top_level_field(kind: &ValidationErrorKind, instance_path: &str) -> Option<String> {
    match instance_path.split('/').nth(1) {
        Some(segment) => Some(segment.replace("~1", "/").replace("~0", "~")),
        None => match kind {
            ValidationErrorKind::Required { property } => property.as_str().map(str::to_string),
            _ => None,
        },
    }
}
