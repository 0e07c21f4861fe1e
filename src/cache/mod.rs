//! Persisted change-detection cache for incremental exports.
//!
//! The cache lives in a JSON sidecar inside the export root and maps each
//! tracked source path to its last-known state. It is loaded once per run,
//! mutated only by the orchestrator after all workers have finished, and
//! written back once at the end.

mod entry;

pub use entry::{CacheEntry, EntryKind};

use crate::infra::{ContentHash, FsError, VaultEntry, write_atomic};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the sidecar file inside the export root.
pub const CACHE_FILE_NAME: &str = ".export_cache.json";

/// Vault configuration files that are re-checked on every run.
pub const ALWAYS_PROCESS: &[&str] = &[".config.yaml", ".config.yml"];

/// Errors loading or saving the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse cache file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write cache file: {0}")]
    Write(#[from] FsError),
}

/// Computes the content digest of a file.
pub fn compute_hash(path: &Path) -> io::Result<ContentHash> {
    ContentHash::compute_file(path)
}

/// Path-keyed export cache.
#[derive(Debug, Clone)]
pub struct ExportCache {
    entries: BTreeMap<String, CacheEntry>,
    file_path: PathBuf,
}

impl ExportCache {
    /// Creates an empty cache whose sidecar lives in `export_root`.
    pub fn new(export_root: &Path) -> Self {
        Self {
            entries: BTreeMap::new(),
            file_path: export_root.join(CACHE_FILE_NAME),
        }
    }

    /// Loads the cache sidecar from `export_root`.
    ///
    /// A missing sidecar yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Read` if the file exists but can't be read, and
    /// `CacheError::Parse` if it is malformed.
    pub fn load(export_root: &Path) -> Result<Self, CacheError> {
        let mut cache = Self::new(export_root);
        let data = match std::fs::read(&cache.file_path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(cache),
            Err(source) => {
                return Err(CacheError::Read {
                    path: cache.file_path,
                    source,
                });
            }
        };

        cache.entries = serde_json::from_slice(&data).map_err(|source| CacheError::Parse {
            path: cache.file_path.clone(),
            source,
        })?;
        debug!(entries = cache.entries.len(), path = %cache.file_path.display(), "loaded export cache");
        Ok(cache)
    }

    /// Writes the full cache to the sidecar, creating the export root if needed.
    pub fn save(&self) -> Result<(), CacheError> {
        let mut data = serde_json::to_vec_pretty(&self.entries)?;
        data.push(b'\n');
        write_atomic(&self.file_path, &data)?;
        debug!(entries = self.entries.len(), path = %self.file_path.display(), "saved export cache");
        Ok(())
    }

    /// Path of the sidecar file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks whether a file differs from its cached state.
    ///
    /// True when there is no entry, when size or mtime differ, or (only when
    /// both match) when the recomputed content hash differs. A file whose hash
    /// can't be computed counts as changed.
    pub fn has_changed(&self, key: &str, source: &Path, size: u64, mtime: i64) -> bool {
        let Some(entry) = self.entries.get(key) else {
            return true;
        };

        if entry.size != Some(size) || entry.mtime != mtime {
            return true;
        }

        match compute_hash(source) {
            Ok(hash) => entry.hash.as_ref() != Some(&hash),
            Err(e) => {
                debug!(path = %source.display(), error = %e, "hash failed; treating as changed");
                true
            }
        }
    }

    /// Splits files into `(to_process, unchanged)`.
    ///
    /// Files named like a vault configuration file are always processed.
    pub fn filter_changed<'a, I>(&self, files: I) -> (Vec<&'a VaultEntry>, Vec<&'a VaultEntry>)
    where
        I: IntoIterator<Item = &'a VaultEntry>,
    {
        let mut to_process = Vec::new();
        let mut unchanged = Vec::new();

        for file in files {
            if ALWAYS_PROCESS.contains(&file.file_name())
                || self.has_changed(&file.relative, &file.path, file.size, file.mtime)
            {
                to_process.push(file);
            } else {
                unchanged.push(file);
            }
        }

        (to_process, unchanged)
    }

    /// File-kind keys that are absent from `current`, in key order.
    ///
    /// Directory entries are reconciled by mirroring, not here.
    pub fn deleted_files(&self, current: &HashSet<&str>) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(key, entry)| entry.kind == EntryKind::File && !current.contains(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Checks whether an entry other than `except` still exports to `path`.
    ///
    /// A renamed source can slug to the same destination as the one it
    /// replaced; that file must survive removal of the old entry.
    pub fn export_path_claimed(&self, path: &Path, except: &str) -> bool {
        self.entries
            .iter()
            .any(|(key, entry)| key != except && entry.export_path.as_deref() == Some(path))
    }

    /// Asset-folder keys whose directory is absent from `current_dirs`.
    pub fn stale_asset_folders(&self, current_dirs: &HashSet<&str>) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(key, entry)| {
                entry.kind == EntryKind::AssetFolder && !current_dirs.contains(key.as_str())
            })
            .map(|(key, _)| key.clone())
            .collect()
    }
}
