//! # Check Runner
//!
//! Names the gate's checks and runs them against a pair of module
//! repositories. Each check is a pure function of the files on disk; no
//! state is shared between checks or between invocations.

use std::fmt;
use std::str::FromStr;

use cgate_core::{ContractViolation, ModuleName, ViolationCode};
use cgate_schema::SchemaValidator;
use serde::{Deserialize, Serialize};

use crate::breaking::check_breaking;
use crate::parity::check_parity;
use crate::repository::ModuleRepository;
use crate::structural::{validate_db, validate_front_end, validate_openapi};

/// The five checks of the gate, in the order `run_all` executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ValidateOpenapi,
    ValidateFe,
    ValidateDb,
    Parity,
    Breaking,
}

impl CheckKind {
    pub fn all() -> &'static [CheckKind] {
        &[
            Self::ValidateOpenapi,
            Self::ValidateFe,
            Self::ValidateDb,
            Self::Parity,
            Self::Breaking,
        ]
    }

    /// Stable name printed in the success line.
    pub fn gate_name(&self) -> &'static str {
        match self {
            Self::ValidateOpenapi => "contract:validate:openapi",
            Self::ValidateFe => "contract:validate:fe",
            Self::ValidateDb => "contract:validate:db",
            Self::Parity => "contract:check:parity",
            Self::Breaking => "contract:check:breaking",
        }
    }

    /// The code this check reports when a module is missing or the module
    /// root is empty.
    pub fn primary_code(&self) -> ViolationCode {
        match self {
            Self::ValidateOpenapi => ViolationCode::OpenapiInvalid,
            Self::ValidateFe => ViolationCode::FeSchemaInvalid,
            Self::ValidateDb => ViolationCode::DbTraceabilityFail,
            Self::Parity => ViolationCode::EndpointParityFail,
            Self::Breaking => ViolationCode::BreakingChangeUnapproved,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gate_name())
    }
}

/// Accepts the gate name (`contract:check:parity`) or the short form (`parity`).
impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| {
                k.gate_name() == s || k.gate_name().rsplit(':').next() == Some(s)
            })
            .ok_or_else(|| format!("unknown check: {s}"))
    }
}

/// Outcome counts of a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub modules_checked: usize,
    /// Modules the pass had nothing to check for (no baseline).
    pub modules_skipped: usize,
}

impl PassSummary {
    pub fn checked(modules_checked: usize) -> Self {
        Self {
            modules_checked,
            modules_skipped: 0,
        }
    }
}

/// A passed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub kind: CheckKind,
    pub summary: PassSummary,
}

impl CheckReport {
    /// The line printed on stdout when the check passes.
    pub fn success_line(&self) -> String {
        format!("{} passed", self.kind.gate_name())
    }
}

/// Lists the modules a pass will visit, failing under the pass's code when
/// there are none.
pub(crate) fn modules_for_pass(
    modules: &ModuleRepository,
    code: ViolationCode,
) -> Result<Vec<ModuleName>, ContractViolation> {
    let names = modules.list_modules().map_err(|e| e.into_violation(code))?;
    if names.is_empty() {
        return Err(ContractViolation::new(
            code,
            format!("No module folders found in {}", modules.root().display()),
        ));
    }
    Ok(names)
}

/// The contract gate: current modules, accepted baseline, structural rules.
#[derive(Debug, Clone)]
pub struct ContractGate {
    modules: ModuleRepository,
    baseline: ModuleRepository,
    schemas: SchemaValidator,
}

impl ContractGate {
    pub fn new(
        modules: ModuleRepository,
        baseline: ModuleRepository,
        schemas: SchemaValidator,
    ) -> Self {
        Self {
            modules,
            baseline,
            schemas,
        }
    }

    pub fn modules(&self) -> &ModuleRepository {
        &self.modules
    }

    pub fn baseline(&self) -> &ModuleRepository {
        &self.baseline
    }

    /// Runs a single check.
    pub fn run(&self, kind: CheckKind) -> Result<CheckReport, ContractViolation> {
        let summary = match kind {
            CheckKind::ValidateOpenapi => validate_openapi(&self.modules, &self.schemas),
            CheckKind::ValidateFe => validate_front_end(&self.modules, &self.schemas),
            CheckKind::ValidateDb => validate_db(&self.modules, &self.schemas),
            CheckKind::Parity => check_parity(&self.modules),
            CheckKind::Breaking => check_breaking(&self.modules, &self.baseline),
        }?;
        tracing::info!(
            check = kind.gate_name(),
            modules_checked = summary.modules_checked,
            modules_skipped = summary.modules_skipped,
            "check passed"
        );
        Ok(CheckReport { kind, summary })
    }

    /// Runs every check in order, calling `on_pass` after each success and
    /// halting on the first violation.
    pub fn run_all(
        &self,
        mut on_pass: impl FnMut(&CheckReport),
    ) -> Result<Vec<CheckReport>, ContractViolation> {
        let mut reports = Vec::with_capacity(CheckKind::all().len());
        for kind in CheckKind::all() {
            let report = self.run(*kind)?;
            on_pass(&report);
            reports.push(report);
        }
        Ok(reports)
    }
}
