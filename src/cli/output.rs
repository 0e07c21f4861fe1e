//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::export::ExportSummary;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Renders an export summary as indented plain text.
pub fn format_summary(summary: &ExportSummary) -> String {
    let mut out = String::new();
    let heading = if summary.cancelled {
        "Export cancelled"
    } else {
        "Export complete"
    };
    out.push_str(heading);
    out.push('\n');

    let rows = [
        ("markdown files", summary.total),
        ("processed", summary.processed),
        ("exported", summary.exported),
        ("unchanged", summary.unchanged),
        ("skipped", summary.skipped),
        ("removed", summary.removed),
        ("assets copied", summary.assets_copied),
        ("errors", summary.errors.len()),
    ];
    for (label, count) in rows {
        out.push_str(&format!("  {:<15} {}\n", format!("{label}:"), count));
    }
    out
}
