//! Configuration schema for stax
//!
//! Config lives at `.config/stax/config.toml` relative to the repository
//! root. Every field has a default: a missing config file means a default
//! config, so the tool works with zero setup.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::Deserialize;

/// Root configuration for stax
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The external branch-stacking tool to shell out to.
    pub tool: ToolConfig,

    /// Preferred trunk branch name. Falls back to the first branch the tool
    /// reports without a parent.
    pub trunk: Option<String>,

    /// Panel server settings.
    pub serve: ServeConfig,
}

/// The external tool invocation. Whatever command is configured must print
/// newline-delimited JSON branch records on stdout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: "gt".to_string(),
            args: vec!["state".to_string(), "--json".to_string()],
        }
    }
}

impl ToolConfig {
    /// The full command line, for error messages and the panel header.
    pub fn command_line(&self) -> String {
        let mut line = self.command.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Port the panel binds on (loopback only).
    pub port: u16,
    /// Open the panel in a browser on startup.
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 4483,
            open: false,
        }
    }
}

impl Config {
    /// Default config path for a repository.
    pub fn default_path(repo_root: &Path) -> PathBuf {
        repo_root.join(".config/stax/config.toml")
    }

    /// Load config from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }
}
