//! # Structural Validation Passes
//!
//! Three independent passes, one per document family, each checking every
//! module against the built-in (or configured) JSON Schemas:
//!
//! | Pass | Documents | Code |
//! |------|-----------|------|
//! | [`validate_openapi`] | `openapi.json` | `OPENAPI_INVALID` |
//! | [`validate_front_end`] | `fe_details.json`, `zod_patch.json` | `FE_SCHEMA_INVALID` |
//! | [`validate_db`] | `prisma_contract.json` | `DB_TRACEABILITY_FAIL` |
//!
//! Every pass stops at the first module with a violation. A module missing
//! one of the pass's documents fails under the pass's code before any of
//! its documents is parsed. Within a module, the reported violation is the
//! highest-ranked one: top-level fields before nested content (across both
//! front-end documents), then schema `required` order, then document order.

use std::path::Path;

use cgate_core::{ContractViolation, DocumentKind, ViolationCode};
use cgate_schema::{SchemaValidationError, SchemaValidator, Violation};
use serde_json::Value;

use crate::repository::ModuleRepository;
use crate::runner::{modules_for_pass, PassSummary};

/// Validates every module's API specification.
pub fn validate_openapi(
    modules: &ModuleRepository,
    schemas: &SchemaValidator,
) -> Result<PassSummary, ContractViolation> {
    structural_pass(
        modules,
        schemas,
        ViolationCode::OpenapiInvalid,
        &[DocumentKind::OpenApi],
    )
}

/// Validates every module's front-end detail document together with its
/// schema patch.
pub fn validate_front_end(
    modules: &ModuleRepository,
    schemas: &SchemaValidator,
) -> Result<PassSummary, ContractViolation> {
    structural_pass(
        modules,
        schemas,
        ViolationCode::FeSchemaInvalid,
        &[DocumentKind::FrontEnd, DocumentKind::SchemaPatch],
    )
}

/// Validates that every database field in every module is traceable.
pub fn validate_db(
    modules: &ModuleRepository,
    schemas: &SchemaValidator,
) -> Result<PassSummary, ContractViolation> {
    structural_pass(
        modules,
        schemas,
        ViolationCode::DbTraceabilityFail,
        &[DocumentKind::DbContract],
    )
}

fn structural_pass(
    modules: &ModuleRepository,
    schemas: &SchemaValidator,
    code: ViolationCode,
    kinds: &[DocumentKind],
) -> Result<PassSummary, ContractViolation> {
    let names = modules_for_pass(modules, code)?;

    for module in &names {
        for kind in kinds {
            modules
                .require_document(module, *kind)
                .map_err(|e| e.into_violation(code))?;
        }

        // Paired documents are judged together: a top-level fault in a later
        // document outranks a nested fault in an earlier one.
        let mut reported: Option<(bool, ContractViolation)> = None;
        for kind in kinds {
            tracing::debug!(module = %module, document = %kind, "validating structure");
            let path = modules.document_path(module, *kind);
            let doc = modules
                .load_document(module, *kind)
                .map_err(|e| e.into_violation(code))?;
            if let Some((nested, violation)) = document_violation(schemas, code, *kind, &doc, &path)
            {
                let outranks = match &reported {
                    None => true,
                    Some((reported_nested, _)) => *reported_nested && !nested,
                };
                if outranks {
                    reported = Some((nested, violation));
                }
            }
        }
        if let Some((_, violation)) = reported {
            return Err(violation);
        }
    }

    Ok(PassSummary::checked(names.len()))
}

/// Checks one parsed document against the schema for its kind, reporting
/// its primary violation under `code`.
pub fn check_document(
    schemas: &SchemaValidator,
    code: ViolationCode,
    kind: DocumentKind,
    doc: &Value,
    path: &Path,
) -> Result<(), ContractViolation> {
    match document_violation(schemas, code, kind, doc, path) {
        Some((_, violation)) => Err(violation),
        None => Ok(()),
    }
}

/// The primary violation of one document, flagged with whether it sits
/// below the document's top-level fields.
fn document_violation(
    schemas: &SchemaValidator,
    code: ViolationCode,
    kind: DocumentKind,
    doc: &Value,
    path: &Path,
) -> Option<(bool, ContractViolation)> {
    match schemas.validate_kind(kind, doc) {
        Ok(()) => None,
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            let primary = violations.primary();
            let nested = primary.is_some_and(Violation::is_nested);
            let detail = primary
                .map(|v| describe(kind, doc, v))
                .unwrap_or_else(|| "document rejected".to_string());
            Some((
                nested,
                ContractViolation::new(code, format!("{detail} in {}", path.display())),
            ))
        }
        Err(other) => Some((
            false,
            ContractViolation::new(
                code,
                format!(
                    "cannot apply structural rules to {}: {other}",
                    path.display()
                ),
            ),
        )),
    }
}

fn describe(kind: DocumentKind, doc: &Value, violation: &Violation) -> String {
    let subject = match kind {
        DocumentKind::DbContract => traced_subject(doc, &violation.instance_path),
        _ => None,
    };
    match subject {
        Some(subject) => format!("{violation} ({subject})"),
        None => violation.to_string(),
    }
}

/// Names the model (`User`) or field (`User.email`) a database-contract
/// pointer such as `/models/0/fields/1/sourceRefs` lands in.
fn traced_subject(doc: &Value, pointer: &str) -> Option<String> {
    let mut segments = pointer.split('/').skip(1);
    if segments.next()? != "models" {
        return None;
    }
    let model = doc.pointer(&format!("/models/{}", segments.next()?))?;
    let model_name = model
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>");

    match (segments.next(), segments.next()) {
        (Some("fields"), Some(field_idx)) => {
            let field_name = model
                .pointer(&format!("/fields/{field_idx}/name"))
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>");
            Some(format!("{model_name}.{field_name}"))
        }
        _ => Some(model_name.to_string()),
    }
}
