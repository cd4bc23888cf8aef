//! # Gate Subcommands
//!
//! Handlers for `validate`, `check`, `all`, and `modules`. Each handler
//! returns the process exit status; a contract violation is an expected
//! outcome, reported on stderr and mapped to [`EXIT_VIOLATION`], while
//! configuration failures propagate as errors.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use cgate_checks::{inventory, CheckKind, CheckReport, ContractGate, ContractViolation};
use cgate_core::DocumentKind;

use crate::{EXIT_OK, EXIT_VIOLATION};

/// Structural validation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateTarget {
    /// API specification documents (`openapi.json`).
    Openapi,
    /// Front-end details and schema patch documents.
    Fe,
    /// Database contract traceability (`prisma_contract.json`).
    Db,
}

impl From<ValidateTarget> for CheckKind {
    fn from(target: ValidateTarget) -> Self {
        match target {
            ValidateTarget::Openapi => CheckKind::ValidateOpenapi,
            ValidateTarget::Fe => CheckKind::ValidateFe,
            ValidateTarget::Db => CheckKind::ValidateDb,
        }
    }
}

/// Cross-document check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckTarget {
    /// Front-end endpoints and schema references resolve.
    Parity,
    /// No baseline endpoint has been removed.
    Breaking,
}

impl From<CheckTarget> for CheckKind {
    fn from(target: CheckTarget) -> Self {
        match target {
            CheckTarget::Parity => CheckKind::Parity,
            CheckTarget::Breaking => CheckKind::Breaking,
        }
    }
}

/// Arguments of `cgate validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(value_enum)]
    pub target: ValidateTarget,
}

/// Arguments of `cgate check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(value_enum)]
    pub target: CheckTarget,
}

pub fn run_validate(args: &ValidateArgs, gate: &ContractGate) -> Result<u8> {
    run_check(gate, args.target.into())
}

pub fn run_check_target(args: &CheckArgs, gate: &ContractGate) -> Result<u8> {
    run_check(gate, args.target.into())
}

/// Runs one check and prints its outcome.
pub fn run_check(gate: &ContractGate, kind: CheckKind) -> Result<u8> {
    match gate.run(kind) {
        Ok(report) => {
            print_pass(&report)?;
            Ok(EXIT_OK)
        }
        Err(violation) => Ok(report_violation(&violation)),
    }
}

/// Runs every check in gate order, printing each success as it happens.
pub fn run_all(gate: &ContractGate) -> Result<u8> {
    let mut write_err = None;
    let outcome = gate.run_all(|report| {
        if let Err(e) = print_pass(report) {
            write_err.get_or_insert(e);
        }
    });
    if let Some(e) = write_err {
        return Err(e);
    }
    match outcome {
        Ok(_) => Ok(EXIT_OK),
        Err(violation) => Ok(report_violation(&violation)),
    }
}

/// Lists discovered modules with their documents and counts.
pub fn run_modules(gate: &ContractGate) -> Result<u8> {
    let items = inventory(gate.modules(), gate.baseline()).context("failed to list modules")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if items.is_empty() {
        writeln!(out, "No module folders found in {}", gate.modules().root().display())?;
        return Ok(EXIT_OK);
    }

    for item in &items {
        let count = |n: Option<usize>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
        writeln!(
            out,
            "{:<24} endpoints={} screens={} schemas={} fields={} baseline={}",
            item.module.as_str(),
            count(item.endpoints),
            count(item.screens),
            count(item.schemas),
            count(item.traced_fields),
            if item.has_baseline { "yes" } else { "no" },
        )?;
        let missing = item.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(DocumentKind::file_name).collect();
            writeln!(out, "  missing: {}", names.join(", "))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Total: {} modules", items.len())?;
    Ok(EXIT_OK)
}

fn print_pass(report: &CheckReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", report.success_line())?;
    Ok(())
}

fn report_violation(violation: &ContractViolation) -> u8 {
    tracing::debug!(code = violation.code.as_str(), "contract violation");
    eprintln!("{violation}");
    EXIT_VIOLATION
}
