//! Export ignore rules loaded from `.export-ignore` at the vault root.
//!
//! One pattern per line; blank lines and `#` comments are skipped. Patterns
//! are matched against vault-relative paths using `/` separators:
//!
//! - `name/` ignores any path with a component equal to `name`
//! - a pattern containing `*` or `?` is a glob matched against the basename
//! - anything else ignores the exact path and everything beneath it

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the ignore file looked up at the vault root.
pub const IGNORE_FILE_NAME: &str = ".export-ignore";

/// Errors while loading ignore rules.
#[derive(Debug, Error)]
pub enum IgnoreError {
    #[error("failed to read ignore file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
enum IgnorePattern {
    DirName(String),
    Glob(Regex),
    Path(String),
}

impl IgnorePattern {
    fn matches(&self, relative: &str) -> bool {
        match self {
            IgnorePattern::DirName(name) => relative.split('/').any(|part| part == name),
            IgnorePattern::Glob(re) => re.is_match(basename(relative)),
            IgnorePattern::Path(prefix) => {
                relative == prefix
                    || relative
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Compiled set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRules {
    /// Loads rules from `<vault>/.export-ignore`.
    ///
    /// A missing file yields an empty rule set.
    ///
    /// # Errors
    ///
    /// Returns `IgnoreError::Read` for any read failure other than not-found,
    /// and `IgnoreError::Pattern` if a glob cannot be compiled.
    pub fn load(vault_root: &Path) -> Result<Self, IgnoreError> {
        let path = vault_root.join(IGNORE_FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(IgnoreError::Read { path, source }),
        }
    }

    /// Parses rules from ignore-file text.
    pub fn parse(text: &str) -> Result<Self, IgnoreError> {
        let mut patterns = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            patterns.push(compile(line)?);
        }
        Ok(Self { patterns })
    }

    /// Returns true if the vault-relative path matches any rule.
    pub fn is_ignored(&self, relative: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(relative))
    }

    /// Number of patterns loaded.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no patterns were loaded.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn compile(pattern: &str) -> Result<IgnorePattern, IgnoreError> {
    if let Some(dir) = pattern.strip_suffix('/') {
        return Ok(IgnorePattern::DirName(dir.to_string()));
    }

    if pattern.contains(['*', '?']) {
        let mut re = String::from("^");
        for c in pattern.chars() {
            match c {
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                _ => re.push_str(&regex::escape(&c.to_string())),
            }
        }
        re.push('$');
        let compiled = Regex::new(&re).map_err(|source| IgnoreError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        return Ok(IgnorePattern::Glob(compiled));
    }

    Ok(IgnorePattern::Path(pattern.trim_start_matches("./").to_string()))
}

fn basename(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}
