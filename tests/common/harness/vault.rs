//! Isolated vault and export directories.

// Allow dead code since this is a test utility shared by several test crates
#![allow(dead_code)]

use super::{TestNote, VaultCommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a vault and an export root.
///
/// Layout under the temp directory:
/// `vault/` for sources, `site/content/` for the export root, so the db
/// destination `<export>/../../db` lands at `db/`.
pub struct TestVault {
    /// The temporary directory (kept for lifetime management)
    temp_dir: TempDir,
    vault_dir: PathBuf,
    export_dir: PathBuf,
}

impl TestVault {
    /// Creates an empty vault. The export root is not created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let vault_dir = temp_dir.path().join("vault");
        let export_dir = temp_dir.path().join("site").join("content");
        std::fs::create_dir_all(&vault_dir).expect("Failed to create vault directory");
        Self {
            temp_dir,
            vault_dir,
            export_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Path of the cache sidecar inside the export root.
    pub fn cache_path(&self) -> PathBuf {
        self.export_dir.join(".export_cache.json")
    }

    /// Writes a note at a vault-relative path and returns its full path.
    pub fn add_note(&self, relative: &str, note: &TestNote) -> PathBuf {
        self.write_file(relative, &note.render())
    }

    /// Writes any file at a vault-relative path, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.vault_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn remove_file(&self, relative: &str) {
        std::fs::remove_file(self.vault_dir.join(relative)).expect("Failed to remove file");
    }

    /// Reads a file from the export root.
    pub fn read_export(&self, relative: &str) -> String {
        let path = self.export_dir.join(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read export {}: {}", path.display(), e))
    }

    pub fn export_exists(&self, relative: &str) -> bool {
        self.export_dir.join(relative).exists()
    }

    /// Parses the cache sidecar.
    pub fn cache(&self) -> Value {
        let contents = std::fs::read_to_string(self.cache_path()).expect("Failed to read cache");
        serde_json::from_str(&contents).expect("Cache is not valid JSON")
    }

    /// A command isolated from the user's config file.
    pub fn cmd(&self) -> VaultCommand {
        VaultCommand::new().config(&self.temp_dir.path().join("config.toml"))
    }

    /// An `export` command pointed at this vault and export root.
    pub fn export(&self) -> VaultCommand {
        self.cmd()
            .export()
            .vault(&self.vault_dir)
            .export_dir(&self.export_dir)
    }

    /// Writes the isolated config file used by [`TestVault::cmd`].
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        path
    }
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_creates_vault_directory() {
        let vault = TestVault::new();
        assert!(vault.vault_dir().is_dir());
        assert!(!vault.export_dir().exists());
    }

    #[test]
    fn test_vault_add_note_creates_parents() {
        let vault = TestVault::new();
        let path = vault.add_note("a/b/Note.md", &TestNote::new("Note"));
        assert!(path.is_file());
        assert!(std::fs::read_to_string(path).unwrap().starts_with("---\ntitle: Note\n"));
    }
}
