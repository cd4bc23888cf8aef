//! # Module Repository
//!
//! Read-only access to a directory of contract modules:
//!
//! ```text
//! <root>/
//!   users/
//!     openapi.json
//!     fe_details.json
//!     zod_patch.json
//!     prisma_contract.json
//!   billing/
//!     ...
//! ```
//!
//! The baseline root uses the same layout and is opened as a second
//! repository. Nothing here writes to disk.

use std::path::{Path, PathBuf};

use cgate_core::{ContractViolation, DocumentKind, ModuleName, ViolationCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Error accessing a module repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The module directory does not contain the requested document.
    #[error("Missing {kind} in {}", .module_dir.display())]
    MissingDocument {
        module: ModuleName,
        kind: DocumentKind,
        module_dir: PathBuf,
    },

    /// The document exists but is unreadable, not JSON, or not decodable
    /// into its typed record.
    #[error("cannot parse {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    /// The repository root exists but could not be listed.
    #[error("cannot list modules in {}: {source}", .root.display())]
    ListFailed {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepositoryError {
    /// Converts the error into the violation a pass reports.
    ///
    /// Missing documents and listing failures are reported under the pass's
    /// own code; parse failures always use [`ViolationCode::DocumentParseError`].
    pub fn into_violation(self, code: ViolationCode) -> ContractViolation {
        let code = match self {
            Self::MalformedDocument { .. } => ViolationCode::DocumentParseError,
            Self::MissingDocument { .. } | Self::ListFailed { .. } => code,
        };
        ContractViolation::new(code, self.to_string())
    }
}

/// A directory of module bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRepository {
    root: PathBuf,
}

impl ModuleRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists one module per subdirectory of the root, sorted by name.
    ///
    /// A missing root yields an empty list. Entries that are not
    /// directories, or whose names are not valid module names, are skipped.
    pub fn list_modules(&self) -> Result<Vec<ModuleName>, RepositoryError> {
        if !self.root.is_dir() {
            tracing::debug!(root = %self.root.display(), "module root does not exist");
            return Ok(Vec::new());
        }

        let list_err = |source: std::io::Error| RepositoryError::ListFailed {
            root: self.root.clone(),
            source,
        };

        let mut modules = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            if !entry.path().is_dir() {
                continue;
            }
            let raw = entry.file_name();
            let Some(name) = raw.to_str() else {
                tracing::warn!(entry = ?raw, "skipping module directory with non-UTF-8 name");
                continue;
            };
            match ModuleName::new(name) {
                Ok(module) => modules.push(module),
                Err(e) => tracing::warn!(%e, "skipping module directory"),
            }
        }
        modules.sort();
        Ok(modules)
    }

    pub fn module_dir(&self, module: &ModuleName) -> PathBuf {
        self.root.join(module.as_str())
    }

    pub fn document_path(&self, module: &ModuleName, kind: DocumentKind) -> PathBuf {
        self.module_dir(module).join(kind.file_name())
    }

    /// True when the document exists as a regular file.
    pub fn has_document(&self, module: &ModuleName, kind: DocumentKind) -> bool {
        self.document_path(module, kind).is_file()
    }

    /// Ensures the document exists, reporting [`RepositoryError::MissingDocument`] if not.
    pub fn require_document(
        &self,
        module: &ModuleName,
        kind: DocumentKind,
    ) -> Result<(), RepositoryError> {
        if self.has_document(module, kind) {
            Ok(())
        } else {
            Err(RepositoryError::MissingDocument {
                module: module.clone(),
                kind,
                module_dir: self.module_dir(module),
            })
        }
    }

    /// Reads and parses a document as untyped JSON.
    pub fn load_document(
        &self,
        module: &ModuleName,
        kind: DocumentKind,
    ) -> Result<Value, RepositoryError> {
        self.require_document(module, kind)?;
        let path = self.document_path(module, kind);
        let content =
            std::fs::read_to_string(&path).map_err(|e| RepositoryError::MalformedDocument {
                path: path.clone(),
                reason: format!("cannot read file: {e}"),
            })?;
        serde_json::from_str(&content).map_err(|e| RepositoryError::MalformedDocument {
            path,
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Reads a document and decodes it into its typed record.
    pub fn load_typed<T: DeserializeOwned>(
        &self,
        module: &ModuleName,
        kind: DocumentKind,
    ) -> Result<T, RepositoryError> {
        let value = self.load_document(module, kind)?;
        serde_json::from_value(value).map_err(|e| RepositoryError::MalformedDocument {
            path: self.document_path(module, kind),
            reason: format!("unexpected document shape: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgate_core::OpenApiDocument;

    fn module(name: &str) -> ModuleName {
        ModuleName::new(name).unwrap()
    }

    #[test]
    fn missing_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ModuleRepository::new(dir.path().join("absent"));
        assert!(repo.list_modules().unwrap().is_empty());
    }

    #[test]
    fn lists_directories_sorted_and_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        std::fs::create_dir(dir.path().join("billing")).unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();

        let repo = ModuleRepository::new(dir.path());
        let names: Vec<String> = repo
            .list_modules()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["billing", "users"]);
    }

    #[test]
    fn missing_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        let repo = ModuleRepository::new(dir.path());

        assert!(!repo.has_document(&module("users"), DocumentKind::OpenApi));
        let err = repo
            .load_document(&module("users"), DocumentKind::OpenApi)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingDocument { .. }));
        assert!(err.to_string().starts_with("Missing openapi.json in "));
    }

    #[test]
    fn directory_named_like_document_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users").join("openapi.json")).unwrap();
        let repo = ModuleRepository::new(dir.path());
        assert!(!repo.has_document(&module("users"), DocumentKind::OpenApi));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/openapi.json"), "{ \"openapi\": ").unwrap();
        let repo = ModuleRepository::new(dir.path());

        let err = repo
            .load_document(&module("users"), DocumentKind::OpenApi)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedDocument { .. }));
        let violation = err.into_violation(ViolationCode::OpenapiInvalid);
        assert_eq!(violation.code, ViolationCode::DocumentParseError);
    }

    #[test]
    fn typed_load_reports_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/openapi.json"), r#"{ "paths": [] }"#).unwrap();
        let repo = ModuleRepository::new(dir.path());

        let err = repo
            .load_typed::<OpenApiDocument>(&module("users"), DocumentKind::OpenApi)
            .unwrap_err();
        assert!(err.to_string().contains("unexpected document shape"));
    }

    #[test]
    fn missing_document_keeps_pass_code() {
        let err = RepositoryError::MissingDocument {
            module: module("users"),
            kind: DocumentKind::FrontEnd,
            module_dir: PathBuf::from("contract_output/modules/users"),
        };
        let violation = err.into_violation(ViolationCode::FeSchemaInvalid);
        assert_eq!(
            violation.to_string(),
            "[FE_SCHEMA_INVALID] Missing fe_details.json in contract_output/modules/users"
        );
    }
}
