//! Invoking the external branch-stacking tool.
//!
//! The tool is a black box that prints newline-delimited JSON branch records
//! on stdout. Failures here are user-facing errors with the command line and
//! stderr attached; they never reach the layout engine.

use std::path::Path;
use std::process::Command;

use eyre::{Result, WrapErr, eyre};
use tracing::debug;

use crate::config::ToolConfig;

/// Run the configured tool in `repo_root` and return its stdout.
pub fn run_stack_tool(config: &ToolConfig, repo_root: &Path) -> Result<String> {
    debug!(
        "Running `{}` in {}",
        config.command_line(),
        repo_root.display()
    );

    let output = Command::new(&config.command)
        .args(&config.args)
        .current_dir(repo_root)
        .output()
        .wrap_err_with(|| format!("Failed to run `{}`", config.command_line()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!(
            "`{}` exited with {}: {}",
            config.command_line(),
            output.status,
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(command: &str, args: &[&str]) -> ToolConfig {
        ToolConfig {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_captures_stdout() {
        let config = tool("echo", &["{\"name\":\"main\"}"]);
        let output = run_stack_tool(&config, Path::new(".")).unwrap();
        assert_eq!(output.trim(), "{\"name\":\"main\"}");
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let config = tool("definitely-not-a-real-command-xyz", &[]);
        let err = run_stack_tool(&config, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-command-xyz"));
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let config = tool("false", &[]);
        let err = run_stack_tool(&config, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
