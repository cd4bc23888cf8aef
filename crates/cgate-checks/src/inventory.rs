//! # Module Inventory
//!
//! A read-only summary of what each module bundle carries. Unlike the
//! checks, building the inventory never fails on a bad document: counts for
//! documents that are missing or do not decode are simply absent.

use cgate_core::{
    extract_api_endpoints, DbContractDocument, DocumentKind, FrontEndDocument, ModuleName,
    OpenApiDocument, SchemaPatchDocument,
};

use crate::repository::{ModuleRepository, RepositoryError};

/// What one module directory contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInventory {
    pub module: ModuleName,
    /// Documents present on disk, in [`DocumentKind::all`] order.
    pub documents: Vec<DocumentKind>,
    pub endpoints: Option<usize>,
    pub screens: Option<usize>,
    pub schemas: Option<usize>,
    pub traced_fields: Option<usize>,
    /// Whether the baseline repository holds a snapshot for this module.
    pub has_baseline: bool,
}

impl ModuleInventory {
    pub fn missing(&self) -> Vec<DocumentKind> {
        DocumentKind::all()
            .iter()
            .copied()
            .filter(|k| !self.documents.contains(k))
            .collect()
    }
}

/// Summarizes every module in `modules`.
pub fn inventory(
    modules: &ModuleRepository,
    baseline: &ModuleRepository,
) -> Result<Vec<ModuleInventory>, RepositoryError> {
    let names = modules.list_modules()?;
    Ok(names
        .into_iter()
        .map(|module| summarize(modules, baseline, module))
        .collect())
}

fn summarize(
    modules: &ModuleRepository,
    baseline: &ModuleRepository,
    module: ModuleName,
) -> ModuleInventory {
    let documents = DocumentKind::all()
        .iter()
        .copied()
        .filter(|k| modules.has_document(&module, *k))
        .collect();

    let endpoints = modules
        .load_typed::<OpenApiDocument>(&module, DocumentKind::OpenApi)
        .ok()
        .map(|doc| extract_api_endpoints(&doc).len());
    let screens = modules
        .load_typed::<FrontEndDocument>(&module, DocumentKind::FrontEnd)
        .ok()
        .map(|doc| doc.screens.len());
    let schemas = modules
        .load_typed::<SchemaPatchDocument>(&module, DocumentKind::SchemaPatch)
        .ok()
        .map(|doc| doc.schema_ids().len());
    let traced_fields = modules
        .load_typed::<DbContractDocument>(&module, DocumentKind::DbContract)
        .ok()
        .map(|doc| doc.field_count());

    ModuleInventory {
        has_baseline: baseline.has_document(&module, DocumentKind::OpenApi),
        module,
        documents,
        endpoints,
        screens,
        schemas,
        traced_fields,
    }
}
