//! # Front-End / API Parity
//!
//! Guards against the front end depending on something the backend
//! contract does not declare. Two sub-checks run per module:
//!
//! 1. **Endpoint parity**: every endpoint a screen proposes must appear in
//!    the module's API specification. The relation is asymmetric: the API
//!    may expose endpoints no screen calls yet.
//! 2. **Schema-reference parity**: every request/response/error schema
//!    reference on a proposal must be a well-formed `zod://<id>` and `<id>`
//!    must be declared in the module's schema patch.
//!
//! Modules are visited in listing order, proposals in document order; the
//! first failure ends the pass.

use std::collections::BTreeSet;

use cgate_core::{
    extract_api_endpoints, extract_front_end_endpoints, parse_schema_ref, ContractViolation,
    DocumentKind, FrontEndDocument, ModuleName, OpenApiDocument, SchemaId, SchemaPatchDocument,
    ViolationCode,
};
use serde_json::Value;

use crate::repository::ModuleRepository;
use crate::runner::{modules_for_pass, PassSummary};

/// Runs both parity sub-checks for every module.
pub fn check_parity(modules: &ModuleRepository) -> Result<PassSummary, ContractViolation> {
    let names = modules_for_pass(modules, ViolationCode::EndpointParityFail)?;

    for module in &names {
        for (kind, code) in [
            (DocumentKind::FrontEnd, ViolationCode::EndpointParityFail),
            (DocumentKind::SchemaPatch, ViolationCode::SchemaRefParityFail),
            (DocumentKind::OpenApi, ViolationCode::EndpointParityFail),
        ] {
            modules
                .require_document(module, kind)
                .map_err(|e| e.into_violation(code))?;
        }

        tracing::debug!(module = %module, "checking front-end parity");
        let front_end: FrontEndDocument = modules
            .load_typed(module, DocumentKind::FrontEnd)
            .map_err(|e| e.into_violation(ViolationCode::EndpointParityFail))?;
        let patch: SchemaPatchDocument = modules
            .load_typed(module, DocumentKind::SchemaPatch)
            .map_err(|e| e.into_violation(ViolationCode::SchemaRefParityFail))?;
        let api: OpenApiDocument = modules
            .load_typed(module, DocumentKind::OpenApi)
            .map_err(|e| e.into_violation(ViolationCode::EndpointParityFail))?;

        check_endpoint_parity(module, &front_end, &api)?;
        check_schema_ref_parity(module, &front_end, &patch)?;
    }

    Ok(PassSummary::checked(names.len()))
}

/// Every front-end endpoint must be declared by the API specification.
pub fn check_endpoint_parity(
    module: &ModuleName,
    front_end: &FrontEndDocument,
    api: &OpenApiDocument,
) -> Result<(), ContractViolation> {
    let declared = extract_api_endpoints(api);
    match extract_front_end_endpoints(front_end)
        .into_iter()
        .find(|endpoint| !declared.contains(endpoint))
    {
        Some(missing) => Err(ContractViolation::new(
            ViolationCode::EndpointParityFail,
            format!("Missing endpoint in openapi for {module}: {missing}"),
        )),
        None => Ok(()),
    }
}

/// Every schema reference on every proposal must parse and resolve.
pub fn check_schema_ref_parity(
    module: &ModuleName,
    front_end: &FrontEndDocument,
    patch: &SchemaPatchDocument,
) -> Result<(), ContractViolation> {
    let declared = patch.schema_ids();
    for proposal in front_end.proposals() {
        for raw in proposal.schema_refs() {
            resolve_ref(module, raw, &declared)?;
        }
    }
    Ok(())
}

fn resolve_ref(
    module: &ModuleName,
    raw: &Value,
    declared: &BTreeSet<SchemaId>,
) -> Result<SchemaId, ContractViolation> {
    let id = parse_schema_ref(raw).ok_or_else(|| {
        ContractViolation::new(
            ViolationCode::SchemaRefParityFail,
            format!("Invalid zod ref format in {module}: {}", display_raw(raw)),
        )
    })?;
    if declared.contains(&id) {
        Ok(id)
    } else {
        Err(ContractViolation::new(
            ViolationCode::SchemaRefParityFail,
            format!("Missing schema in zod_patch for {module}: {id}"),
        ))
    }
}

/// Strings print bare; anything else prints as JSON.
fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
