//! Repo configuration (.podlane.toml)
//!
//! The lane root carries a `.podlane.toml` naming the release catalog and,
//! optionally, the worker bound and the linter invocation. CLI flags
//! override the optional fields; the catalog has no override and no
//! default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::lint::{LintTool, DEFAULT_ARGS, DEFAULT_TOOL};
use crate::selection::Catalog;

/// File name looked up inside the lane root.
pub const CONFIG_FILE: &str = ".podlane.toml";

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Linter invocation overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintSection {
    /// Linter program (default: "pod").
    pub tool: Option<String>,

    /// Arguments placed before the spec file (default: ["lib", "lint"]).
    pub args: Option<Vec<String>>,
}

/// Repository configuration from `.podlane.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoConfig {
    /// Known package names: the lint catalog (required, non-empty).
    #[serde(default)]
    pub packages: Vec<String>,

    /// Worker bound for the job pool (default: available CPU parallelism).
    pub jobs: Option<usize>,

    /// Linter invocation.
    #[serde(default)]
    pub lint: LintSection,
}

impl RepoConfig {
    /// Load and parse config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse config from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RepoConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config from its well-known location under `root`.
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(ConfigError::Validation(format!(
                "{} not found in {} (the catalog is required)",
                CONFIG_FILE,
                root.display()
            )));
        }
        Self::from_file(&path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::Validation(
                "at least one package must be listed in 'packages'".to_string(),
            ));
        }

        if self.jobs == Some(0) {
            return Err(ConfigError::Validation(
                "'jobs' must be greater than zero".to_string(),
            ));
        }

        if let Some(tool) = &self.lint.tool {
            if tool.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "'lint.tool' must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The release catalog declared by this config.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.packages.iter().cloned())
    }

    /// The linter invocation declared by this config.
    pub fn lint_tool(&self) -> LintTool {
        let program = self
            .lint
            .tool
            .clone()
            .unwrap_or_else(|| DEFAULT_TOOL.to_string());
        let args = self
            .lint
            .args
            .clone()
            .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|s| s.to_string()).collect());
        LintTool::new(program, args)
    }
}
