//! # cgate CLI entry point
//!
//! Parses command-line arguments, resolves the gate configuration, and
//! dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cgate_cli::config::{GateConfig, Overrides};
use cgate_cli::gate::{run_all, run_check_target, run_modules, run_validate, CheckArgs, ValidateArgs};
use cgate_cli::{find_project_root, EXIT_CONFIG};

/// Contract gate for generated module contracts.
///
/// Verifies that each module's API specification, front-end details,
/// schema patch, and database contract are well-formed and mutually
/// consistent, and that no endpoint of the accepted baseline was removed.
#[derive(Parser, Debug)]
#[command(name = "cgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one folder per module bundle.
    #[arg(long, global = true)]
    modules_root: Option<PathBuf>,

    /// Directory holding the accepted baseline snapshots.
    #[arg(long, global = true)]
    baseline_root: Option<PathBuf>,

    /// Directory of `*.schema.json` files overriding the built-in schemas.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Structural validation of one document family.
    Validate(ValidateArgs),

    /// Cross-document parity or baseline breaking-change check.
    Check(CheckArgs),

    /// Run every check in order, stopping at the first violation.
    All,

    /// List discovered modules and the documents each carries.
    Modules,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let project_root = find_project_root(&cwd).unwrap_or_else(|| {
        tracing::debug!("no contract_output/ above the current directory; using it as project root");
        cwd.clone()
    });
    tracing::debug!(project_root = %project_root.display(), "resolved project root");

    let overrides = Overrides {
        modules_root: cli.modules_root,
        baseline_root: cli.baseline_root,
        schema_dir: cli.schema_dir,
    };
    let gate = match GateConfig::resolve(&project_root, cli.config.as_deref(), overrides)
        .and_then(|config| {
            tracing::debug!(
                modules_root = %config.modules_root.display(),
                baseline_root = %config.baseline_root.display(),
                "gate configured"
            );
            config.build_gate()
        }) {
        Ok(gate) => gate,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &gate),
        Commands::Check(args) => run_check_target(args, &gate),
        Commands::All => run_all(&gate),
        Commands::Modules => run_modules(&gate),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}
