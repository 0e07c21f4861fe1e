//! Incremental export of a vault into a standard markdown tree.
//!
//! A run moves through enumerate, select, dispatch, reconcile, mirror and
//! persist. Workers never see the cache: they return result values and the
//! coordinating thread alone updates it once every worker has finished.

mod exporter;
mod mirror;
mod options;
mod report;
mod worker;

pub use exporter::{Exporter, SKIP_MISSING_FRONTMATTER, is_markdown};
pub use options::{CancelFlag, DEFAULT_WORKERS, ExportOptions};
pub use report::{ExportReporter, ExportSummary, FileResult, NoopReporter};

use crate::cache::CacheError;
use crate::infra::{FsError, IgnoreError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export run.
///
/// Per-file problems are not errors at this level; they are collected in
/// `ExportSummary::errors`.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to load ignore rules: {0}")]
    Ignore(#[from] IgnoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("cannot read vault: {0}")]
    Vault(#[source] FsError),

    #[error("failed to create export directory {path}: {source}")]
    CreateExportRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file {path} does not exist, is ignored, or is outside the vault")]
    NotInVault { path: PathBuf },

    #[error("failed to export {path}: {source}")]
    File {
        path: String,
        #[source]
        source: FsError,
    },
}
