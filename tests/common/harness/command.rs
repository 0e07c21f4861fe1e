//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility shared by several test crates
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Fluent wrapper around `assert_cmd::Command` for the `vaultpress` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct VaultCommand {
    args: Vec<String>,
}

impl VaultCommand {
    /// Creates a new command for the `vaultpress` binary.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Sets the global `--config` option.
    pub fn config(self, path: &Path) -> Self {
        self.path_arg("--config", path)
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    fn path_arg(mut self, flag: &str, path: &Path) -> Self {
        self.args.push(flag.to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("vaultpress").expect("Failed to find vaultpress binary");
        cmd.env_remove("RUST_LOG");
        cmd.args(&self.args);
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `export` command.
    pub fn export(self) -> Self {
        self.args(["export"])
    }

    pub fn vault(self, path: &Path) -> Self {
        self.path_arg("--vault", path)
    }

    pub fn export_dir(self, path: &Path) -> Self {
        self.path_arg("--export", path)
    }

    pub fn db_dir(self, path: &Path) -> Self {
        self.path_arg("--db-dir", path)
    }

    pub fn file(self, path: &str) -> Self {
        self.args(["--file", path])
    }

    pub fn workers(self, workers: usize) -> Self {
        self.args(["--workers".to_string(), workers.to_string()])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }
}

impl Default for VaultCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_runs_binary() {
        VaultCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = VaultCommand::new()
            .export()
            .vault(Path::new("v"))
            .workers(3)
            .format_json();
        assert_eq!(
            cmd.get_args(),
            ["export", "--vault", "v", "--workers", "3", "--format", "json"]
        );
    }
}
