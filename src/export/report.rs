//! Export results and progress reporting.

use serde::Serialize;
use std::path::PathBuf;

/// Totals for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Markdown files found in the vault.
    pub total: usize,
    /// Files selected for processing (changed or new).
    pub processed: usize,
    /// Files written to the export tree.
    pub exported: usize,
    /// Files left alone because the cache says they did not change.
    pub unchanged: usize,
    /// Files deliberately not exported (policy skips).
    pub skipped: usize,
    /// Deleted sources whose exports and cache entries were removed.
    pub removed: usize,
    /// Files copied while mirroring asset and db directories.
    pub assets_copied: usize,
    /// Non-fatal errors, one message each.
    pub errors: Vec<String>,
    /// True if the run was stopped early.
    pub cancelled: bool,
}

impl ExportSummary {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome for a single vault path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResult {
    /// Written to `destination`.
    Exported { destination: PathBuf },
    /// Unchanged since the last run.
    Unchanged,
    /// Not exported, with the reason recorded in the cache.
    Skipped { reason: String },
    /// Source deleted; its export was removed.
    Removed,
    /// Directory mirrored to `destination`.
    Mirrored { destination: PathBuf, files: usize },
    /// Failed; will be retried next run.
    Error(String),
}

/// Receives progress updates during an export.
///
/// Called from the coordinating thread only, never from workers.
pub trait ExportReporter {
    /// Called once per vault path with its outcome.
    fn on_file(&mut self, path: &str, result: &FileResult);
    /// Called when the run is complete.
    fn on_complete(&mut self, summary: &ExportSummary);
}

/// A reporter that ignores everything.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ExportReporter for NoopReporter {
    fn on_file(&mut self, _path: &str, _result: &FileResult) {}
    fn on_complete(&mut self, _summary: &ExportSummary) {}
}
