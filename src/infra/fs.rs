//! Filesystem boundary: vault enumeration, whole-file reads and atomic writes.

use crate::infra::ignore::IgnoreRules;
use std::io::{self, Write as IoWrite};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// Errors during file system operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("destination escapes the export root: {path}")]
    OutsideRoot { path: PathBuf },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },
}

impl FsError {
    /// Creates an appropriate FsError from an io::Error.
    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Kind of an enumerated vault entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A file or directory found while walking the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    /// Vault-relative path with `/` separators; also the cache key.
    pub relative: String,
    /// Full path on disk.
    pub path: PathBuf,
    pub entry_type: EntryType,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch.
    pub mtime: i64,
}

impl VaultEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

/// Walks a vault once, returning every non-ignored file and directory.
///
/// The root itself is not included and ignored directories are not
/// descended into. Entries are sorted by relative path so
/// that enumeration order is the same on every platform. Unreadable entries
/// below the root are logged and skipped.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the directory doesn't exist.
/// Returns `FsError::NotADirectory` if the path is not a directory.
pub fn scan_vault(root: &Path, rules: &IgnoreRules) -> Result<Vec<VaultEntry>, FsError> {
    let meta = std::fs::metadata(root).map_err(|e| FsError::from_io(root, e))?;
    if !meta.is_dir() {
        return Err(FsError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| relative_key(root, e.path()).is_none_or(|rel| !rules.is_ignored(&rel)));
    for item in walker {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "skipping unreadable vault entry");
                continue;
            }
        };

        let Some(relative) = relative_key(root, item.path()) else {
            continue;
        };

        let metadata = match item.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %item.path().display(), error = %e, "cannot stat vault entry");
                continue;
            }
        };

        let entry_type = if metadata.is_dir() {
            EntryType::Directory
        } else if metadata.is_file() {
            EntryType::File
        } else {
            continue;
        };

        entries.push(VaultEntry {
            relative,
            path: item.path().to_path_buf(),
            entry_type,
            size: if metadata.is_file() { metadata.len() } else { 0 },
            mtime: metadata.modified().map(unix_seconds).unwrap_or(0),
        });
    }

    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(entries)
}

/// Returns `path` relative to `root` with `/` separators.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Joins a `/`-separated relative path under `root`.
///
/// # Errors
///
/// Returns `FsError::OutsideRoot` if `relative` is empty, absolute or climbs
/// with `..`, since the result would not be strictly inside `root`.
pub fn join_within(root: &Path, relative: &str) -> Result<PathBuf, FsError> {
    let rel = Path::new(relative);
    let escapes = relative.is_empty()
        || rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FsError::OutsideRoot {
            path: root.join(relative),
        });
    }
    Ok(root.join(rel))
}

/// Converts a timestamp to whole seconds since the Unix epoch.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Modification time of a path in whole seconds, or `None` if it can't be read.
pub fn modified_seconds(path: &Path) -> Option<i64> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(unix_seconds)
        .ok()
}

/// Reads a text file into memory.
///
/// # Errors
///
/// Returns `FsError::NotFound`/`PermissionDenied`/`Io` for read failures and
/// `FsError::InvalidEncoding` if the file is UTF-16 or not valid UTF-8.
pub fn read_text(path: &Path) -> Result<String, FsError> {
    let bytes = std::fs::read(path).map_err(|e| FsError::from_io(path, e))?;

    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(FsError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 detected (byte order mark); convert to UTF-8".into(),
        });
    }

    String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })
}

/// Writes bytes to a path atomically, creating parent directories as needed.
///
/// Uses a temporary file in the destination directory and an atomic rename
/// so readers never observe a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FsError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| FsError::from_io(parent, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::from_io(path, e))?;
    temp.write_all(contents)
        .map_err(|e| FsError::from_io(path, e))?;
    temp.persist(path).map_err(|e| FsError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    Ok(())
}

/// Copies one file, creating the destination's parent directory.
pub fn copy_file(source: &Path, destination: &Path) -> Result<u64, FsError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FsError::from_io(parent, e))?;
    }
    std::fs::copy(source, destination).map_err(|e| FsError::from_io(source, e))
}

/// Removes a previously exported file or directory tree.
///
/// A path that is already gone counts as removed.
pub fn remove_export(path: &Path) -> Result<(), FsError> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FsError::from_io(path, e)),
    }
}

/// Lexically normalizes a path, folding `.` and `..` without touching disk.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
