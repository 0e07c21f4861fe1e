//! Export configuration and cancellation.

use crate::infra::DEFAULT_REQUIRED_KEYS;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default number of parallel workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Settings for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Vault root. If this names a file, only that file is exported and its
    /// directory is used as the vault root.
    pub vault: PathBuf,
    /// Export root; holds the exported tree and the cache sidecar.
    pub export: PathBuf,
    /// Worker pool size (at least 1).
    pub workers: usize,
    /// Shared db directory mirrored to `<export>/../../db`.
    pub db_dir: Option<PathBuf>,
    /// Frontmatter keys a note must define to be exported.
    pub required_keys: Vec<String>,
    /// Export only this file (absolute or relative to the vault root).
    pub single_file: Option<PathBuf>,
}

impl ExportOptions {
    pub fn new(vault: impl Into<PathBuf>, export: impl Into<PathBuf>) -> Self {
        Self {
            vault: vault.into(),
            export: export.into(),
            workers: DEFAULT_WORKERS,
            db_dir: None,
            required_keys: DEFAULT_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
            single_file: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_db_dir(mut self, db_dir: impl Into<PathBuf>) -> Self {
        self.db_dir = Some(db_dir.into());
        self
    }

    pub fn with_required_keys(mut self, keys: Vec<String>) -> Self {
        self.required_keys = keys;
        self
    }

    pub fn with_single_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.single_file = Some(file.into());
        self
    }
}

/// Shared flag that asks a running export to stop pulling new work.
///
/// Files already written keep their cache entries; the cache is still saved.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ExportOptions::new("vault", "content");
        assert_eq!(options.workers, DEFAULT_WORKERS);
        assert_eq!(options.required_keys, vec!["title".to_string()]);
        assert!(options.db_dir.is_none());
    }

    #[test]
    fn workers_never_zero() {
        assert_eq!(ExportOptions::new("v", "e").with_workers(0).workers, 1);
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
