//! Harness configuration.
//!
//! Settings come from a TOML file; anything missing falls back to the
//! defaults below, and command-line flags override both.

use std::path::{Path, PathBuf};

use posit8_core::Operation;
use posit8_core::matrix::Arithmetic;
use serde::{Deserialize, Serialize};

use crate::compare::DEFAULT_OPS;
use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "POSIT8_XCHECK_CONFIG";

/// Directory name under the platform config directory.
pub const PROJECT_NAME: &str = "posit8-xcheck";

/// Top-level harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcheckConfig {
    /// External device program; the in-process kernels are used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_program: Option<PathBuf>,

    /// Value table to enumerate pairs from.
    pub table_path: PathBuf,

    /// Concurrent device evaluations; available parallelism when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Deadline for one device invocation, in seconds.
    pub timeout_secs: u64,

    /// Where to write the JSON report, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,

    /// Operations to check, in order.
    pub ops: Vec<Operation>,

    /// Benchmark settings.
    pub bench: BenchConfig,
}

impl Default for XcheckConfig {
    fn default() -> Self {
        Self {
            device_program: None,
            table_path: PathBuf::from("8_bit.csv"),
            jobs: None,
            timeout_secs: 10,
            report_path: None,
            ops: DEFAULT_OPS.to_vec(),
            bench: BenchConfig::default(),
        }
    }
}

/// `[bench]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Matrix side length.
    pub n: usize,
    /// Products to time.
    pub iterations: u32,
    /// RNG seed for the input matrix.
    pub seed: u64,
    /// Engine the products run on.
    pub arithmetic: Arithmetic,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n: 4,
            iterations: 1,
            seed: 0,
            arithmetic: Arithmetic::Device,
        }
    }
}

impl XcheckConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at the resolved path, or the defaults when that file
    /// does not exist.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        match resolve_config_path(config_path) {
            Some(path) if path.exists() => Self::load_file(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "No config file; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Loads a specific config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == Some(0) {
            return Err(Error::config("jobs must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be at least 1"));
        }
        if let Some(op) = self.ops.iter().find(|op| !op.is_arithmetic()) {
            return Err(Error::config(format!("'{op}' cannot be cross-checked")));
        }
        Ok(())
    }
}

/// Default config location: `<config dir>/posit8-xcheck/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
}

/// Resolves the config path: an explicit path wins, then
/// `POSIT8_XCHECK_CONFIG`, then the platform default.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}
