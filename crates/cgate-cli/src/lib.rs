//! # cgate-cli — Command Line for the Contract Gate
//!
//! Provides the `cgate` binary that CI runs after contract generation.
//!
//! ## Subcommands
//!
//! - `cgate validate openapi|fe|db`: structural validation of one
//!   document family.
//! - `cgate check parity|breaking`: cross-document and baseline checks.
//! - `cgate all`: every check in gate order, stopping at the first
//!   violation.
//! - `cgate modules`: inventory of the discovered module bundles.
//!
//! ## Output Contract
//!
//! A passing check prints `<gate name> passed` on stdout. A violation
//! prints `[<CODE>] <message>` on stderr and exits with status 1.
//! Configuration errors exit with status 2. Logs always go to stderr:
//!
//! ```bash
//! cgate all
//! cgate -v check breaking --baseline-root snapshots/modules
//! ```

pub mod config;
pub mod gate;

use std::path::{Path, PathBuf};

/// Exit status of a passing run.
pub const EXIT_OK: u8 = 0;
/// Exit status when a check reports a contract violation.
pub const EXIT_VIOLATION: u8 = 1;
/// Exit status for configuration and usage errors.
pub const EXIT_CONFIG: u8 = 2;

/// Directory whose presence marks the project root.
pub const PROJECT_MARKER: &str = "contract_output";

/// Resolve a path that may be relative to the project root.
///
/// Absolute paths are returned as-is; relative paths are joined onto
/// `project_root`.
pub fn resolve_path(path: &Path, project_root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Walk up from `start` to the first directory containing
/// [`PROJECT_MARKER`].
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).is_dir())
        .map(Path::to_path_buf)
}
