//! Per-file export work and the worker pool that runs it.

use crate::cache::CacheEntry;
use crate::export::options::CancelFlag;
use crate::infra::{
    ContentHash, FsError, VaultEntry, join_within, read_text, slugify_relative_path, write_atomic,
};
use crate::links::{LinkIndex, LinkRewriter, extract_links, slugify_markdown_links};
use std::path::Path;
use std::sync::{Mutex, mpsc};
use std::thread;
use tracing::{debug, info};

/// Destinations refused directly in the export root.
const RESERVED_ROOT_FILES: &[&str] = &["home.md", "index.md"];

/// Shared, read-only state every worker needs.
pub(crate) struct WorkerContext<'a> {
    pub vault_root: &'a Path,
    pub export_root: &'a Path,
    pub index: &'a LinkIndex,
}

/// What happened to a file that was processed without error.
#[derive(Debug)]
pub(crate) enum Outcome {
    Exported(CacheEntry),
    Skipped(CacheEntry),
}

/// A worker's answer for one file.
#[derive(Debug)]
pub(crate) struct ProcessResult<'a> {
    pub entry: &'a VaultEntry,
    pub outcome: Result<Outcome, FsError>,
}

/// Reads, rewrites and writes one file.
///
/// The returned cache entry describes exactly what was written, so a file and
/// its entry always come from the same pass.
pub(crate) fn process_file(ctx: &WorkerContext<'_>, entry: &VaultEntry) -> Result<Outcome, FsError> {
    let content = read_text(&entry.path)?;
    let hash = ContentHash::compute(content.as_bytes());

    let slugged = slugify_relative_path(&entry.relative);
    if !slugged.contains('/') && RESERVED_ROOT_FILES.contains(&slugged.as_str()) {
        info!(path = %entry.relative, "skipping root file");
        return Ok(Outcome::Skipped(CacheEntry::skipped_file(
            entry.size,
            entry.mtime,
            hash,
            format!("Ignored root file: {}", slugged),
        )));
    }

    let links = extract_links(&content);
    let resolved = ctx.index.resolve_links(&links);
    let rewrite = LinkRewriter::new(ctx.vault_root, &entry.relative, &resolved).rewrite(&content);
    let output = slugify_markdown_links(&rewrite.content);

    let destination = join_within(ctx.export_root, &slugged)?;
    write_atomic(&destination, output.as_bytes())?;

    debug!(
        path = %entry.relative,
        links = links.len(),
        resolved = rewrite.resolved,
        broken = rewrite.broken,
        "rewrote links"
    );
    info!(source = %entry.relative, destination = %destination.display(), "exported");

    Ok(Outcome::Exported(CacheEntry::file(
        entry.size,
        entry.mtime,
        hash,
        destination,
        links,
    )))
}

/// Runs `process_file` over `files` on a fixed pool of scoped threads.
///
/// Both queues are sized to the batch so neither side ever blocks on a full
/// channel. Returns once every worker has exited. After `cancel` is raised,
/// workers stop taking jobs and only finished results come back.
pub(crate) fn run_pool<'a>(
    ctx: &WorkerContext<'_>,
    files: &[&'a VaultEntry],
    workers: usize,
    cancel: &CancelFlag,
) -> Vec<ProcessResult<'a>> {
    if files.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, files.len());

    let (job_tx, job_rx) = mpsc::sync_channel::<&'a VaultEntry>(files.len());
    let (result_tx, result_rx) = mpsc::sync_channel::<ProcessResult<'a>>(files.len());

    for &file in files {
        if job_tx.send(file).is_err() {
            break;
        }
    }
    drop(job_tx);

    let job_rx = Mutex::new(job_rx);

    thread::scope(|scope| {
        for worker_id in 0..workers {
            let result_tx = result_tx.clone();
            let job_rx = &job_rx;
            scope.spawn(move || {
                loop {
                    if cancel.is_cancelled() {
                        debug!(worker_id, "cancelled; stopping");
                        break;
                    }
                    let job = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(entry) = job else { break };

                    let outcome = process_file(ctx, entry);
                    if result_tx.send(ProcessResult { entry, outcome }).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<ProcessResult<'a>> = result_rx.into_iter().collect();
    results.sort_by(|a, b| a.entry.relative.cmp(&b.entry.relative));
    results
}
