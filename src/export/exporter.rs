//! The export orchestrator.

use crate::cache::{CacheEntry, EntryKind, ExportCache, compute_hash};
use crate::export::ExportError;
use crate::export::mirror::{Mirror, MirrorOutcome, asset_dirs};
use crate::export::options::{CancelFlag, ExportOptions};
use crate::export::report::{ExportReporter, ExportSummary, FileResult, NoopReporter};
use crate::export::worker::{Outcome, WorkerContext, process_file, run_pool};
use crate::infra::fs::{normalize_lexically, relative_key};
use crate::infra::{
    FsError, IgnoreRules, VaultEntry, contains_required_keys, join_within, remove_export,
    scan_vault, slugify_path, slugify_relative_path,
};
use crate::links::LinkIndex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Skip reason recorded for notes without the required frontmatter keys.
pub const SKIP_MISSING_FRONTMATTER: &str = "Missing required frontmatter";

/// Where the shared db directory lands, relative to the export root.
const DB_EXPORT_PATH: &str = "../../db";

/// Returns true for `.md` and `.mdx` files (any case).
pub fn is_markdown(relative: &str) -> bool {
    let lower = relative.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

// ===========================================
// Exporter
// ===========================================

/// Exports a vault into a standard markdown tree.
///
/// Only files whose size, mtime or content changed since the last run are
/// rewritten. Exports of deleted notes are removed and asset directories are
/// mirrored. The cache sidecar in the export root is saved once at the end.
pub struct Exporter {
    options: ExportOptions,
    cancel: CancelFlag,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            cancel: CancelFlag::new(),
        }
    }

    /// Uses an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// A handle that stops this exporter when raised.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Runs one export.
    ///
    /// # Errors
    ///
    /// Fails on setup problems only: unreadable ignore file, malformed cache,
    /// missing vault, or an export root that can't be created. In single-file
    /// mode a missing target or a failure to export it is also an error.
    pub fn run(&self) -> Result<ExportSummary, ExportError> {
        self.run_with_progress(&mut NoopReporter)
    }

    /// Runs one export with progress reporting.
    pub fn run_with_progress<R: ExportReporter>(
        &self,
        reporter: &mut R,
    ) -> Result<ExportSummary, ExportError> {
        let (vault_root, single_file) = self.targets();
        let export_root = self.options.export.as_path();

        let rules = IgnoreRules::load(&vault_root)?;
        std::fs::create_dir_all(export_root).map_err(|source| ExportError::CreateExportRoot {
            path: export_root.to_path_buf(),
            source,
        })?;
        let mut cache = ExportCache::load(export_root)?;

        // Enumerate
        let mut entries = scan_vault(&vault_root, &rules).map_err(ExportError::Vault)?;
        if let Some(nested) = nested_export_dir(&vault_root, export_root) {
            debug!(path = %nested, "excluding export directory inside vault");
            entries.retain(|e| !is_within(&e.relative, &nested));
        }
        let index = LinkIndex::from_entries(&entries);
        info!(
            vault = %vault_root.display(),
            export = %export_root.display(),
            files = index.len(),
            ignore_patterns = rules.len(),
            "scanned vault"
        );

        let ctx = WorkerContext {
            vault_root: &vault_root,
            export_root,
            index: &index,
        };
        let mut summary = ExportSummary::default();

        match single_file {
            Some(file) => {
                self.export_single(&ctx, &entries, &file, &mut cache, &mut summary, reporter)?
            }
            None => self.export_all(&ctx, &entries, &rules, &mut cache, &mut summary, reporter),
        }

        // Persist
        cache.save()?;
        info!(
            exported = summary.exported,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            removed = summary.removed,
            errors = summary.errors.len(),
            "export complete"
        );
        reporter.on_complete(&summary);
        Ok(summary)
    }

    /// Resolves the vault root and the single-file target, if any.
    fn targets(&self) -> (PathBuf, Option<PathBuf>) {
        let vault = &self.options.vault;
        if vault.is_file() {
            let root = vault
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            return (root, Some(vault.clone()));
        }

        let single = self.options.single_file.as_ref().map(|file| {
            if file.is_absolute() || file.exists() {
                file.clone()
            } else {
                vault.join(file)
            }
        });
        (vault.clone(), single)
    }

    // ===========================================
    // Batch Mode
    // ===========================================

    fn export_all<R: ExportReporter>(
        &self,
        ctx: &WorkerContext<'_>,
        entries: &[VaultEntry],
        rules: &IgnoreRules,
        cache: &mut ExportCache,
        summary: &mut ExportSummary,
        reporter: &mut R,
    ) {
        // Select
        let markdown: Vec<&VaultEntry> = entries
            .iter()
            .filter(|e| e.is_file() && is_markdown(&e.relative))
            .collect();
        let (changed, unchanged) = cache.filter_changed(markdown.iter().copied());

        summary.total = markdown.len();
        summary.unchanged = unchanged.len();
        for file in &unchanged {
            reporter.on_file(&file.relative, &FileResult::Unchanged);
        }
        info!(
            total = markdown.len(),
            to_process = changed.len(),
            unchanged = unchanged.len(),
            "selected files"
        );

        let mut eligible = Vec::with_capacity(changed.len());
        for file in changed {
            if contains_required_keys(&file.path, &self.options.required_keys) {
                eligible.push(file);
            } else {
                summary.processed += 1;
                record_frontmatter_skip(cache, file, summary, reporter);
            }
        }

        // Dispatch
        if !eligible.is_empty() {
            info!(files = eligible.len(), workers = self.options.workers, "processing files");
        }
        let results = run_pool(ctx, &eligible, self.options.workers, &self.cancel);

        // Reconcile
        summary.processed += results.len();
        for result in results {
            reconcile(cache, result.entry, result.outcome, summary, reporter);
        }

        if self.cancel.is_cancelled() {
            warn!("export cancelled; keeping finished files");
            summary.cancelled = true;
            return;
        }

        let current: HashSet<&str> = markdown.iter().map(|e| e.relative.as_str()).collect();
        remove_deleted(cache, &current, summary, reporter);

        // Mirror
        let mirror = Mirror {
            vault_root: ctx.vault_root,
            rules,
        };
        let assets = asset_dirs(entries);
        let current_dirs: HashSet<&str> = assets.iter().map(|e| e.relative.as_str()).collect();
        remove_stale_asset_folders(cache, &current_dirs, summary, reporter);

        for dir in assets {
            let destination = match join_within(ctx.export_root, &slugify_path(&dir.relative)) {
                Ok(destination) => destination,
                Err(e) => {
                    warn!(path = %dir.relative, error = %e, "cannot mirror assets");
                    let message = e.to_string();
                    reporter.on_file(&dir.relative, &FileResult::Error(message.clone()));
                    summary.errors.push(message);
                    continue;
                }
            };
            let outcome = mirror.mirror(
                cache,
                &dir.relative,
                EntryKind::AssetFolder,
                &dir.path,
                &destination,
            );
            record_mirror(&dir.relative, &destination, outcome, summary, reporter);
        }

        if let Some(db_dir) = &self.options.db_dir {
            self.mirror_db(&mirror, ctx.export_root, db_dir, cache, summary, reporter);
        }
    }

    fn mirror_db<R: ExportReporter>(
        &self,
        mirror: &Mirror<'_>,
        export_root: &Path,
        db_dir: &Path,
        cache: &mut ExportCache,
        summary: &mut ExportSummary,
        reporter: &mut R,
    ) {
        if !db_dir.is_dir() {
            info!(path = %db_dir.display(), "db folder not found");
            return;
        }

        let key = db_dir.to_string_lossy().into_owned();
        let destination =
            normalize_lexically(&export_root.join(slugify_relative_path(DB_EXPORT_PATH)));
        let outcome = mirror.mirror(cache, &key, EntryKind::DbDirectory, db_dir, &destination);
        record_mirror(&key, &destination, outcome, summary, reporter);
    }

    // ===========================================
    // Single-File Mode
    // ===========================================

    fn export_single<R: ExportReporter>(
        &self,
        ctx: &WorkerContext<'_>,
        entries: &[VaultEntry],
        file: &Path,
        cache: &mut ExportCache,
        summary: &mut ExportSummary,
        reporter: &mut R,
    ) -> Result<(), ExportError> {
        let not_in_vault = || ExportError::NotInVault {
            path: file.to_path_buf(),
        };

        let key = relative_key(ctx.vault_root, file)
            .or_else(|| {
                let root = ctx.vault_root.canonicalize().ok()?;
                relative_key(&root, &file.canonicalize().ok()?)
            })
            .ok_or_else(not_in_vault)?;
        let entry = entries
            .iter()
            .find(|e| e.is_file() && e.relative == key)
            .ok_or_else(not_in_vault)?;

        summary.total = 1;
        summary.processed = 1;

        if !contains_required_keys(&entry.path, &self.options.required_keys) {
            record_frontmatter_skip(cache, entry, summary, reporter);
            return Ok(());
        }

        match process_file(ctx, entry) {
            Ok(outcome) => {
                reconcile(cache, entry, Ok(outcome), summary, reporter);
                Ok(())
            }
            Err(source) => Err(ExportError::File { path: key, source }),
        }
    }
}

// ===========================================
// Reconciliation Helpers
// ===========================================

fn reconcile<R: ExportReporter>(
    cache: &mut ExportCache,
    entry: &VaultEntry,
    outcome: Result<Outcome, FsError>,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    match outcome {
        Ok(Outcome::Exported(cache_entry)) => {
            let destination = cache_entry.export_path.clone().unwrap_or_default();
            summary.exported += 1;
            cache.set(&entry.relative, cache_entry);
            reporter.on_file(&entry.relative, &FileResult::Exported { destination });
        }
        Ok(Outcome::Skipped(cache_entry)) => {
            let reason = cache_entry.skip_reason.clone().unwrap_or_default();
            summary.skipped += 1;
            cache.set(&entry.relative, cache_entry);
            reporter.on_file(&entry.relative, &FileResult::Skipped { reason });
        }
        Err(e) => {
            warn!(path = %entry.relative, error = %e, "failed to export file");
            let message = e.to_string();
            reporter.on_file(&entry.relative, &FileResult::Error(message.clone()));
            summary.errors.push(message);
        }
    }
}

fn record_frontmatter_skip<R: ExportReporter>(
    cache: &mut ExportCache,
    entry: &VaultEntry,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    match compute_hash(&entry.path) {
        Ok(hash) => {
            debug!(path = %entry.relative, "missing required frontmatter");
            cache.set(
                &entry.relative,
                CacheEntry::skipped_file(entry.size, entry.mtime, hash, SKIP_MISSING_FRONTMATTER),
            );
            summary.skipped += 1;
            reporter.on_file(
                &entry.relative,
                &FileResult::Skipped {
                    reason: SKIP_MISSING_FRONTMATTER.to_string(),
                },
            );
        }
        Err(e) => {
            warn!(path = %entry.relative, error = %e, "cannot hash file");
            let message = format!("{}: {}", entry.path.display(), e);
            reporter.on_file(&entry.relative, &FileResult::Error(message.clone()));
            summary.errors.push(message);
        }
    }
}

/// Removes exports of files that are no longer in the vault.
///
/// An entry whose export can't be removed is kept so removal is retried.
fn remove_deleted<R: ExportReporter>(
    cache: &mut ExportCache,
    current: &HashSet<&str>,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    let deleted = cache.deleted_files(current);
    if !deleted.is_empty() {
        info!(count = deleted.len(), "removing deleted files");
    }
    for key in deleted {
        drop_entry(cache, &key, summary, reporter);
    }
}

fn remove_stale_asset_folders<R: ExportReporter>(
    cache: &mut ExportCache,
    current_dirs: &HashSet<&str>,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    for key in cache.stale_asset_folders(current_dirs) {
        drop_entry(cache, &key, summary, reporter);
    }
}

fn drop_entry<R: ExportReporter>(
    cache: &mut ExportCache,
    key: &str,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    let export_path = cache.get(key).and_then(|e| e.export_path.clone());
    if let Some(path) = export_path {
        if cache.export_path_claimed(&path, key) {
            debug!(source = %key, export = %path.display(), "export now belongs to another source");
        } else if let Err(e) = remove_export(&path) {
            warn!(source = %key, export = %path.display(), error = %e, "could not remove export");
            let message = e.to_string();
            reporter.on_file(key, &FileResult::Error(message.clone()));
            summary.errors.push(message);
            return;
        } else {
            info!(source = %key, export = %path.display(), "removed export");
        }
    }
    cache.remove(key);
    summary.removed += 1;
    reporter.on_file(key, &FileResult::Removed);
}

fn record_mirror<R: ExportReporter>(
    key: &str,
    destination: &Path,
    outcome: MirrorOutcome,
    summary: &mut ExportSummary,
    reporter: &mut R,
) {
    let MirrorOutcome::Copied(stats) = outcome else {
        return;
    };
    info!(source = %key, destination = %destination.display(), files = stats.copied, "mirrored directory");
    summary.assets_copied += stats.copied;
    summary.errors.extend(stats.errors);
    reporter.on_file(
        key,
        &FileResult::Mirrored {
            destination: destination.to_path_buf(),
            files: stats.copied,
        },
    );
}

/// Vault-relative path of the export root, if it lies inside the vault.
fn nested_export_dir(vault_root: &Path, export_root: &Path) -> Option<String> {
    let vault = vault_root.canonicalize().ok()?;
    let export = export_root.canonicalize().ok()?;
    relative_key(&vault, &export)
}

fn is_within(relative: &str, dir: &str) -> bool {
    relative == dir
        || relative
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}
