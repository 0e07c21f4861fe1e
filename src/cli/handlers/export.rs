//! Export command handler.

use anyhow::{Context, Result};

use super::ConsoleReporter;
use crate::cli::ExportArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat, format_summary};
use crate::export::{ExportOptions, Exporter};

/// Merges CLI arguments over the config file into library options.
pub fn build_options(args: &ExportArgs, config: &Config) -> ExportOptions {
    let mut options = ExportOptions::new(
        config.vault_dir(args.vault.as_ref()),
        config.export_dir(args.export.as_ref()),
    )
    .with_workers(config.workers(args.workers))
    .with_required_keys(config.required_keys());

    if let Some(db_dir) = config.db_dir(args.db_dir.as_ref()) {
        options = options.with_db_dir(db_dir);
    }
    if let Some(file) = &args.file {
        options = options.with_single_file(file);
    }
    options
}

pub fn handle_export(args: &ExportArgs, config: &Config, verbose: bool) -> Result<()> {
    let options = build_options(args, config);
    let vault = options.vault.clone();
    let export = options.export.clone();

    // Per-file lines would corrupt JSON on stdout.
    let mut reporter = ConsoleReporter::new(verbose && args.format == OutputFormat::Human);
    let summary = Exporter::new(options)
        .run_with_progress(&mut reporter)
        .with_context(|| {
            format!(
                "failed to export {} to {}",
                vault.display(),
                export.display()
            )
        })?;

    match args.format {
        OutputFormat::Human => print!("{}", format_summary(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&Output::new(&summary))?),
    }

    Ok(())
}
