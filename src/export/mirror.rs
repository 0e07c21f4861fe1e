//! Mirroring of asset and db directories into the export tree.
//!
//! Directories are compared only by their own modification time. Editing a
//! file in place usually doesn't bump the directory's mtime, so such edits are
//! picked up only once something is added, removed or renamed inside it.

use crate::cache::{CacheEntry, EntryKind, ExportCache};
use crate::infra::fs::relative_key;
use crate::infra::{IgnoreRules, VaultEntry, copy_file, modified_seconds, slugify, slugify_filename};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the directories that are mirrored verbatim.
pub(crate) const ASSETS_DIR: &str = "assets";

/// Result of copying one directory tree.
#[derive(Debug, Default)]
pub(crate) struct CopyStats {
    pub copied: usize,
    pub errors: Vec<String>,
}

/// What mirroring one directory did.
#[derive(Debug)]
pub(crate) enum MirrorOutcome {
    Unchanged,
    Copied(CopyStats),
}

/// Asset directories to mirror: named `assets` with no `assets` ancestor.
pub(crate) fn asset_dirs(entries: &[VaultEntry]) -> Vec<&VaultEntry> {
    entries
        .iter()
        .filter(|e| e.is_dir() && e.file_name() == ASSETS_DIR)
        .filter(|e| {
            let mut parts: Vec<&str> = e.relative.split('/').collect();
            parts.pop();
            !parts.contains(&ASSETS_DIR)
        })
        .collect()
}

/// Copies directories into the export tree, honoring ignore rules.
pub(crate) struct Mirror<'a> {
    pub vault_root: &'a Path,
    pub rules: &'a IgnoreRules,
}

impl Mirror<'_> {
    /// Mirrors `source` to `destination` unless its mtime matches the cache.
    ///
    /// On copy the cache entry under `key` is replaced.
    pub fn mirror(
        &self,
        cache: &mut ExportCache,
        key: &str,
        kind: EntryKind,
        source: &Path,
        destination: &Path,
    ) -> MirrorOutcome {
        let mtime = modified_seconds(source).unwrap_or(0);
        let unchanged = cache
            .get(key)
            .is_some_and(|entry| entry.kind == kind && entry.mtime == mtime);
        if unchanged {
            debug!(path = %key, "directory unchanged");
            return MirrorOutcome::Unchanged;
        }

        let mut stats = CopyStats::default();
        self.copy_tree(source, destination, kind == EntryKind::AssetFolder, &mut stats);
        cache.set(key, CacheEntry::directory(kind, mtime, destination.to_path_buf()));
        MirrorOutcome::Copied(stats)
    }

    /// Recursively copies `source` into `destination` with slugified names.
    ///
    /// Ignored entries are skipped, as are nested `assets` directories when
    /// `skip_nested_assets` is set. Per-entry failures are logged and
    /// collected; the rest of the tree is still copied.
    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        skip_nested_assets: bool,
        stats: &mut CopyStats,
    ) {
        let mut children: Vec<PathBuf> = match std::fs::read_dir(source) {
            Ok(read) => read.filter_map(Result::ok).map(|e| e.path()).collect(),
            Err(e) => {
                warn!(path = %source.display(), error = %e, "cannot read directory");
                stats.errors.push(format!("{}: {}", source.display(), e));
                return;
            }
        };
        children.sort();

        if let Err(e) = std::fs::create_dir_all(destination) {
            warn!(path = %destination.display(), error = %e, "cannot create directory");
            stats.errors.push(format!("{}: {}", destination.display(), e));
            return;
        }

        for child in children {
            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let ignored = relative_key(self.vault_root, &child)
                .is_some_and(|relative| self.rules.is_ignored(&relative));
            if ignored {
                continue;
            }

            if child.is_dir() {
                if skip_nested_assets && name == ASSETS_DIR {
                    debug!(path = %child.display(), "skipping nested assets directory");
                    continue;
                }
                self.copy_tree(&child, &destination.join(slugify(&name)), skip_nested_assets, stats);
            } else {
                let target = destination.join(slugify_filename(&name));
                match copy_file(&child, &target) {
                    Ok(_) => stats.copied += 1,
                    Err(e) => {
                        warn!(source = %child.display(), target = %target.display(), error = %e, "copy failed");
                        stats.errors.push(e.to_string());
                    }
                }
            }
        }
    }
}
