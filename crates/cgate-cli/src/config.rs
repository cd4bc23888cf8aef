//! # Gate Configuration
//!
//! Where the gate looks for module bundles, baseline snapshots, and
//! structural schemas. Layered lowest to highest: built-in defaults, the
//! YAML file named by `--config`, then command-line flags.
//!
//! ```yaml
//! modules_root: build/contracts/modules
//! baseline_root: contracts/baseline/modules
//! schema_dir: contracts/schemas
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use cgate_checks::{ContractGate, ModuleRepository};
use cgate_schema::SchemaValidator;

use crate::resolve_path;

/// Default location of the generated module bundles.
pub const DEFAULT_MODULES_ROOT: &str = "contract_output/modules";
/// Default location of the accepted baseline snapshots.
pub const DEFAULT_BASELINE_ROOT: &str = "contract_baseline/modules";

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub modules_root: Option<PathBuf>,
    pub baseline_root: Option<PathBuf>,
    pub schema_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

/// Command-line overrides, applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub modules_root: Option<PathBuf>,
    pub baseline_root: Option<PathBuf>,
    pub schema_dir: Option<PathBuf>,
}

/// Fully resolved configuration. All paths are absolute or rooted at the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub modules_root: PathBuf,
    pub baseline_root: PathBuf,
    /// `None` selects the built-in schemas.
    pub schema_dir: Option<PathBuf>,
}

impl GateConfig {
    /// Defaults rooted at `project_root`.
    pub fn defaults(project_root: &Path) -> Self {
        Self {
            modules_root: project_root.join(DEFAULT_MODULES_ROOT),
            baseline_root: project_root.join(DEFAULT_BASELINE_ROOT),
            schema_dir: None,
        }
    }

    /// Layers the optional config file and the overrides over the defaults.
    pub fn resolve(
        project_root: &Path,
        config_file: Option<&Path>,
        overrides: Overrides,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                let path = resolve_path(path, project_root);
                tracing::debug!(config = %path.display(), "loading config file");
                ConfigFile::load(&path)?
            }
            None => ConfigFile::default(),
        };

        let defaults = Self::defaults(project_root);
        let pick = |flag: Option<PathBuf>, file: Option<PathBuf>| {
            flag.or(file).map(|p| resolve_path(&p, project_root))
        };

        Ok(Self {
            modules_root: pick(overrides.modules_root, file.modules_root)
                .unwrap_or(defaults.modules_root),
            baseline_root: pick(overrides.baseline_root, file.baseline_root)
                .unwrap_or(defaults.baseline_root),
            schema_dir: pick(overrides.schema_dir, file.schema_dir),
        })
    }

    /// Loads and compiles the structural schemas.
    pub fn schemas(&self) -> Result<SchemaValidator> {
        let schemas = match &self.schema_dir {
            Some(dir) => SchemaValidator::new(dir)
                .with_context(|| format!("failed to load schemas from {}", dir.display()))?,
            None => SchemaValidator::builtin().context("failed to load built-in schemas")?,
        };
        schemas
            .compile_all()
            .context("structural schemas do not compile")?;
        Ok(schemas)
    }

    /// Builds the gate this configuration describes.
    pub fn build_gate(&self) -> Result<ContractGate> {
        Ok(ContractGate::new(
            ModuleRepository::new(&self.modules_root),
            ModuleRepository::new(&self.baseline_root),
            self.schemas()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_rooted_at_project() {
        let config = GateConfig::resolve(Path::new("/p"), None, Overrides::default()).unwrap();
        assert_eq!(config.modules_root, PathBuf::from("/p/contract_output/modules"));
        assert_eq!(config.baseline_root, PathBuf::from("/p/contract_baseline/modules"));
        assert_eq!(config.schema_dir, None);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cgate.yaml"),
            "modules_root: out/modules\nschema_dir: /etc/cgate/schemas\n",
        )
        .unwrap();

        let config = GateConfig::resolve(
            dir.path(),
            Some(Path::new("cgate.yaml")),
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.modules_root, dir.path().join("out/modules"));
        assert_eq!(
            config.baseline_root,
            dir.path().join(DEFAULT_BASELINE_ROOT)
        );
        assert_eq!(config.schema_dir, Some(PathBuf::from("/etc/cgate/schemas")));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("cgate.yaml");
        std::fs::write(&config_path, "baseline_root: from-file\n").unwrap();

        let config = GateConfig::resolve(
            dir.path(),
            Some(&config_path),
            Overrides {
                baseline_root: Some(PathBuf::from("from-flag")),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.baseline_root, dir.path().join("from-flag"));
    }

    #[test]
    fn empty_config_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cgate.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ConfigFile::load(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn unknown_config_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cgate.yaml");
        std::fs::write(&path, "module_root: typo\n").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = GateConfig::resolve(
            Path::new("/nonexistent"),
            Some(Path::new("cgate.yaml")),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn built_in_schemas_build_a_gate() {
        let dir = tempfile::tempdir().unwrap();
        let config = GateConfig::defaults(dir.path());
        let gate = config.build_gate().unwrap();
        assert_eq!(gate.modules().root(), dir.path().join(DEFAULT_MODULES_ROOT));
    }

    #[test]
    fn broken_schema_override_fails_gate_construction() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = dir.path().join("schemas");
        std::fs::create_dir_all(&schemas).unwrap();
        std::fs::write(schemas.join("prisma-contract.schema.json"), "not json").unwrap();

        let config = GateConfig {
            schema_dir: Some(schemas),
            ..GateConfig::defaults(dir.path())
        };
        assert!(config.build_gate().is_err());
    }
}
