//! # Breaking-Change Detection
//!
//! Compares each module's current API specification with the accepted
//! baseline snapshot. Only strict removals count: an endpoint identifier
//! present in the baseline and absent now. Additions pass, and a renamed
//! path parameter shows up as a removal of the old identifier.
//!
//! A module without a baseline snapshot has nothing to regress against and
//! is skipped.

use std::collections::BTreeSet;

use cgate_core::{
    extract_api_endpoints, ContractViolation, DocumentKind, EndpointId, ModuleName,
    OpenApiDocument, ViolationCode,
};

use crate::repository::ModuleRepository;
use crate::runner::{modules_for_pass, PassSummary};

const CODE: ViolationCode = ViolationCode::BreakingChangeUnapproved;

/// Checks every current module against its baseline, if one exists.
pub fn check_breaking(
    modules: &ModuleRepository,
    baseline: &ModuleRepository,
) -> Result<PassSummary, ContractViolation> {
    let names = modules_for_pass(modules, CODE)?;
    let mut skipped = 0usize;

    for module in &names {
        modules
            .require_document(module, DocumentKind::OpenApi)
            .map_err(|_| {
                ContractViolation::new(
                    CODE,
                    format!(
                        "Missing current openapi.json for {module} in {}",
                        modules.module_dir(module).display()
                    ),
                )
            })?;

        if !baseline.has_document(module, DocumentKind::OpenApi) {
            tracing::debug!(module = %module, "no baseline; skipping compatibility check");
            skipped += 1;
            continue;
        }

        tracing::debug!(module = %module, "comparing against baseline");
        let current: OpenApiDocument = modules
            .load_typed(module, DocumentKind::OpenApi)
            .map_err(|e| e.into_violation(CODE))?;
        let previous: OpenApiDocument = baseline
            .load_typed(module, DocumentKind::OpenApi)
            .map_err(|e| e.into_violation(CODE))?;

        check_removed_endpoints(module, &previous, &current)?;
    }

    Ok(PassSummary {
        modules_checked: names.len() - skipped,
        modules_skipped: skipped,
    })
}

/// Endpoints present in `baseline` but absent from `current`, sorted.
pub fn removed_endpoints(
    baseline: &OpenApiDocument,
    current: &OpenApiDocument,
) -> BTreeSet<EndpointId> {
    let now = extract_api_endpoints(current);
    extract_api_endpoints(baseline)
        .into_iter()
        .filter(|endpoint| !now.contains(endpoint))
        .collect()
}

/// Fails on the first removed endpoint.
pub fn check_removed_endpoints(
    module: &ModuleName,
    baseline: &OpenApiDocument,
    current: &OpenApiDocument,
) -> Result<(), ContractViolation> {
    match removed_endpoints(baseline, current).into_iter().next() {
        Some(endpoint) => Err(ContractViolation::new(
            CODE,
            format!("Removed endpoint: {module} -> {endpoint}"),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(paths: Value) -> OpenApiDocument {
        serde_json::from_value(json!({ "openapi": "3.0.0", "paths": paths })).unwrap()
    }

    #[test]
    fn additions_are_not_breaking() {
        let baseline = doc(json!({ "/api/y": { "get": {} } }));
        let current = doc(json!({ "/api/y": { "get": {}, "post": {} }, "/api/z": { "get": {} } }));
        assert!(removed_endpoints(&baseline, &current).is_empty());
    }

    #[test]
    fn removal_names_exact_endpoint() {
        let module = ModuleName::new("users").unwrap();
        let baseline = doc(json!({ "/api/y": { "get": {} }, "/api/z": { "get": {} } }));
        let current = doc(json!({ "/api/z": { "get": {} } }));
        let err = check_removed_endpoints(&module, &baseline, &current).unwrap_err();
        assert_eq!(err.code, ViolationCode::BreakingChangeUnapproved);
        assert_eq!(err.message, "Removed endpoint: users -> GET /api/y");
    }

    #[test]
    fn method_case_change_is_not_a_removal() {
        let baseline = doc(json!({ "/api/y": { "get": {} } }));
        let current = doc(json!({ "/api/y": { "GET": {} } }));
        assert!(removed_endpoints(&baseline, &current).is_empty());
    }

    #[test]
    fn path_parameter_rename_is_a_removal() {
        let baseline = doc(json!({ "/api/users/{id}": { "get": {} } }));
        let current = doc(json!({ "/api/users/{userId}": { "get": {} } }));
        let removed: Vec<String> = removed_endpoints(&baseline, &current)
            .into_iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(removed, vec!["GET /api/users/{id}"]);
    }

    fn write_openapi(root: &std::path::Path, value: Value) {
        let dir = root.join("users");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("openapi.json"), value.to_string()).unwrap();
    }

    #[test]
    fn numeric_baseline_version_is_still_compared() {
        let current = tempfile::tempdir().unwrap();
        let baseline = tempfile::tempdir().unwrap();
        write_openapi(
            current.path(),
            json!({ "openapi": "3.0.0", "paths": { "/api/x": { "get": {} } } }),
        );
        write_openapi(
            baseline.path(),
            json!({ "openapi": 3.0, "paths": { "/api/x": { "get": {} } } }),
        );

        let summary = check_breaking(
            &ModuleRepository::new(current.path()),
            &ModuleRepository::new(baseline.path()),
        )
        .unwrap();
        assert_eq!(summary.modules_checked, 1);
        assert_eq!(summary.modules_skipped, 0);
    }

    #[test]
    fn numeric_baseline_version_still_reports_removals() {
        let current = tempfile::tempdir().unwrap();
        let baseline = tempfile::tempdir().unwrap();
        write_openapi(
            current.path(),
            json!({ "openapi": "3.0.0", "paths": { "/api/x": { "get": {} } } }),
        );
        write_openapi(
            baseline.path(),
            json!({ "openapi": 3.0, "paths": { "/api/x": { "get": {}, "delete": {} } } }),
        );

        let err = check_breaking(
            &ModuleRepository::new(current.path()),
            &ModuleRepository::new(baseline.path()),
        )
        .unwrap_err();
        assert_eq!(err.message, "Removed endpoint: users -> DELETE /api/x");
    }

    #[test]
    fn null_baseline_paths_remove_nothing() {
        let baseline: OpenApiDocument =
            serde_json::from_value(json!({ "openapi": "3.0.0", "paths": null })).unwrap();
        let current = doc(json!({ "/api/x": { "get": {} } }));
        assert!(removed_endpoints(&baseline, &current).is_empty());
    }
}
