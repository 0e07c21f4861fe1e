//! Command handlers for the CLI.

mod completions;
mod export;

pub use completions::handle_completions;
pub use export::{build_options, handle_export};

use crate::export::{ExportReporter, ExportSummary, FileResult};

// ===========================================
// Shared Utilities
// ===========================================

/// Progress reporter that prints to stdout.
///
/// Per-file lines appear only when verbose; errors always go to stderr.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ExportReporter for ConsoleReporter {
    fn on_file(&mut self, path: &str, result: &FileResult) {
        if let FileResult::Error(msg) = result {
            eprintln!("  error: {}: {}", path, msg);
            return;
        }
        if !self.verbose {
            return;
        }
        match result {
            FileResult::Exported { destination } => {
                println!("  exported: {} -> {}", path, destination.display())
            }
            FileResult::Unchanged => println!("  unchanged: {}", path),
            FileResult::Skipped { reason } => println!("  skipped: {} ({})", path, reason),
            FileResult::Removed => println!("  removed: {}", path),
            FileResult::Mirrored { destination, files } => println!(
                "  mirrored: {} -> {} ({} files)",
                path,
                destination.display(),
                files
            ),
            FileResult::Error(_) => {}
        }
    }

    fn on_complete(&mut self, summary: &ExportSummary) {
        if summary.has_errors() {
            eprintln!(
                "Exported {} notes with {} errors",
                summary.exported,
                summary.errors.len()
            );
        }
    }
}
