//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::DEFAULT_WORKERS;
use crate::infra::DEFAULT_REQUIRED_KEYS;

/// Vault directory used when neither the CLI nor the config names one.
pub const DEFAULT_VAULT_DIR: &str = "vault";

/// Export directory used when neither the CLI nor the config names one.
pub const DEFAULT_EXPORT_DIR: &str = "content";

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Vault root to export
    pub vault: Option<PathBuf>,

    /// Export root (holds the cache sidecar)
    pub export: Option<PathBuf>,

    /// Number of parallel export workers
    pub workers: Option<usize>,

    /// Shared db directory mirrored beside the site
    pub db_dir: Option<PathBuf>,

    /// Frontmatter keys a note must define to be exported
    pub required_keys: Option<Vec<String>>,

    /// Log level when `-v` is not given (error, warn, info, debug, trace)
    pub log_level: Option<String>,

    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or the default location if `None`.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/vaultpress/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultpress")
            .join("config.toml")
    }

    /// Resolve the vault root.
    ///
    /// Precedence order:
    /// 1. CLI `--vault` argument
    /// 2. Config file `vault` setting
    /// 3. `./vault`
    pub fn vault_dir(&self, cli_vault: Option<&PathBuf>) -> PathBuf {
        cli_vault
            .cloned()
            .or_else(|| self.vault.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VAULT_DIR))
    }

    /// Resolve the export root. Same precedence as [`Config::vault_dir`].
    pub fn export_dir(&self, cli_export: Option<&PathBuf>) -> PathBuf {
        cli_export
            .cloned()
            .or_else(|| self.export.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR))
    }

    pub fn workers(&self, cli_workers: Option<usize>) -> usize {
        cli_workers.or(self.workers).unwrap_or(DEFAULT_WORKERS)
    }

    /// The db directory is optional at every level.
    pub fn db_dir(&self, cli_db_dir: Option<&PathBuf>) -> Option<PathBuf> {
        cli_db_dir.cloned().or_else(|| self.db_dir.clone())
    }

    pub fn required_keys(&self) -> Vec<String> {
        self.required_keys
            .clone()
            .unwrap_or_else(|| DEFAULT_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect())
    }

    /// Resolve the log level.
    ///
    /// Any `-v` wins over the config file: one flag is `debug`, two or more
    /// is `trace`. Without flags the config `log_level` applies, then `warn`.
    pub fn log_level(&self, verbose: u8) -> String {
        match verbose {
            0 => self.log_level.clone().unwrap_or_else(|| "warn".to_string()),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    // ===========================================
    // Loading
    // ===========================================

    #[test]
    fn default_config_has_no_paths() {
        let config = Config::default();
        assert!(config.vault.is_none());
        assert!(config.export.is_none());
        assert!(config.db_dir.is_none());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert!(config.vault.is_none());
    }

    #[test]
    fn load_reads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
vault = "/notes"
export = "/site/content"
workers = 4
db_dir = "/shared/db"
required_keys = ["title", "date"]
log_level = "info"
log_file = "/tmp/vaultpress.log"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.vault, Some(PathBuf::from("/notes")));
        assert_eq!(config.export, Some(PathBuf::from("/site/content")));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.db_dir, Some(PathBuf::from("/shared/db")));
        assert_eq!(config.required_keys(), vec!["title".to_string(), "date".to_string()]);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/vaultpress.log")));
    }

    #[test]
    fn load_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("dir = \"/notes\"").is_err());
    }

    #[test]
    fn config_path_is_in_config_dir() {
        let path = Config::config_path();
        assert!(path.ends_with("vaultpress/config.toml"));
    }

    // ===========================================
    // Precedence
    // ===========================================

    #[test]
    fn vault_dir_prefers_cli_arg() {
        let config = Config {
            vault: Some(PathBuf::from("/config/vault")),
            ..Default::default()
        };
        let cli = PathBuf::from("/cli/vault");
        assert_eq!(config.vault_dir(Some(&cli)), PathBuf::from("/cli/vault"));
    }

    #[test]
    fn vault_dir_falls_back_to_config_then_default() {
        let config = Config {
            vault: Some(PathBuf::from("/config/vault")),
            ..Default::default()
        };
        assert_eq!(config.vault_dir(None), PathBuf::from("/config/vault"));
        assert_eq!(Config::default().vault_dir(None), PathBuf::from("vault"));
        assert_eq!(Config::default().export_dir(None), PathBuf::from("content"));
    }

    #[test]
    fn workers_precedence() {
        let config = Config {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.workers(Some(8)), 8);
        assert_eq!(config.workers(None), 3);
        assert_eq!(Config::default().workers(None), DEFAULT_WORKERS);
    }

    #[test]
    fn db_dir_is_optional() {
        assert_eq!(Config::default().db_dir(None), None);
        let cli = PathBuf::from("/db");
        assert_eq!(Config::default().db_dir(Some(&cli)), Some(cli));
    }

    #[test]
    fn required_keys_default_to_title() {
        assert_eq!(Config::default().required_keys(), vec!["title".to_string()]);
    }

    #[test]
    fn verbose_flag_overrides_log_level() {
        let config = Config {
            log_level: Some("info".into()),
            ..Default::default()
        };
        assert_eq!(config.log_level(0), "info");
        assert_eq!(config.log_level(1), "debug");
        assert_eq!(config.log_level(3), "trace");
        assert_eq!(Config::default().log_level(0), "warn");
    }
}
