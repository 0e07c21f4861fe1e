//! Cache entry types.

use crate::infra::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a cache entry tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A markdown source file.
    #[default]
    File,
    /// A mirrored `assets` directory.
    AssetFolder,
    /// The shared db directory.
    DbDirectory,
}

impl EntryKind {
    pub fn is_directory(self) -> bool {
        matches!(self, EntryKind::AssetFolder | EntryKind::DbDirectory)
    }
}

/// Last-known state and export outcome of a tracked path.
///
/// Files carry `size`, `hash` and `links`; directories only use `mtime` as a
/// change signal. `skip_reason` is present exactly when the file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    pub mtime: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,

    #[serde(default)]
    pub kind: EntryKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl CacheEntry {
    /// Entry for a file that was exported to `export_path`.
    pub fn file(
        size: u64,
        mtime: i64,
        hash: ContentHash,
        export_path: PathBuf,
        links: Vec<String>,
    ) -> Self {
        Self {
            size: Some(size),
            mtime,
            hash: Some(hash),
            export_path: Some(export_path),
            links,
            kind: EntryKind::File,
            skip_reason: None,
        }
    }

    /// Entry for a file that was deliberately not exported.
    pub fn skipped_file(size: u64, mtime: i64, hash: ContentHash, reason: impl Into<String>) -> Self {
        Self {
            size: Some(size),
            mtime,
            hash: Some(hash),
            export_path: None,
            links: Vec::new(),
            kind: EntryKind::File,
            skip_reason: Some(reason.into()),
        }
    }

    /// Entry for a mirrored directory.
    pub fn directory(kind: EntryKind, mtime: i64, export_path: PathBuf) -> Self {
        debug_assert!(kind.is_directory());
        Self {
            size: None,
            mtime,
            hash: None,
            export_path: Some(export_path),
            links: Vec::new(),
            kind,
            skip_reason: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}
