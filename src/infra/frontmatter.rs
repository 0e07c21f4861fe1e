//! Frontmatter extraction for vault notes.
//!
//! Only the boundary the exporter needs is implemented here: splitting a
//! document into its YAML mapping and body, and checking that the mapping
//! carries a set of required keys.

use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

/// Keys every exportable note must define.
pub const DEFAULT_REQUIRED_KEYS: &[&str] = &["title"];

/// Errors during frontmatter extraction.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("missing opening frontmatter delimiter '---'")]
    MissingOpeningDelimiter,

    #[error("missing closing frontmatter delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("frontmatter is not a mapping")]
    NotAMapping,
}

/// Splits markdown content into its frontmatter fields and body.
///
/// # Format
/// ```text
/// ---
/// title: Note Title
/// tags: [a, b]
/// ---
/// Body content here...
/// ```
///
/// A UTF-8 byte order mark before the opening delimiter is ignored. An empty
/// block (`---` immediately followed by `---`) yields an empty mapping.
///
/// # Errors
///
/// Returns `FrontmatterError` if:
/// - The content doesn't start with `---`
/// - There's no closing `---` delimiter
/// - The YAML between delimiters is invalid or not a mapping
pub fn extract_frontmatter(content: &str) -> Result<(Mapping, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);

    let after_opening = if content.starts_with("---\r\n") {
        5
    } else if content.starts_with("---\n") {
        4
    } else if content == "---" {
        return Err(FrontmatterError::MissingClosingDelimiter);
    } else {
        return Err(FrontmatterError::MissingOpeningDelimiter);
    };

    let yaml_and_rest = &content[after_opening..];
    let closing_pos = find_closing_delimiter(yaml_and_rest)?;
    let yaml_content = &yaml_and_rest[..closing_pos];

    let after_closing = &yaml_and_rest[closing_pos..];
    let body = if let Some(body) = after_closing.strip_prefix("---\r\n") {
        body
    } else if let Some(body) = after_closing.strip_prefix("---\n") {
        body
    } else {
        ""
    };

    let fields = if yaml_content.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml_content)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        }
    };

    Ok((fields, body))
}

/// Checks whether content has frontmatter defining every key in `keys`.
///
/// Content without parseable frontmatter never satisfies the check.
pub fn has_required_keys(content: &str, keys: &[String]) -> bool {
    match extract_frontmatter(content) {
        Ok((fields, _)) => keys
            .iter()
            .all(|key| fields.contains_key(Value::String(key.clone()))),
        Err(_) => false,
    }
}

/// Reads a file and checks its frontmatter for the required keys.
///
/// Unreadable or non-UTF-8 files never satisfy the check.
pub fn contains_required_keys(path: &Path, keys: &[String]) -> bool {
    std::fs::read_to_string(path).is_ok_and(|content| has_required_keys(&content, keys))
}

/// Finds the position of the closing `---` delimiter.
///
/// The closing delimiter must:
/// - Appear at the start of a line
/// - Be exactly `---` followed by newline or EOF
fn find_closing_delimiter(content: &str) -> Result<usize, FrontmatterError> {
    let mut pos = 0;
    let bytes = content.as_bytes();

    while pos < bytes.len() {
        if content[pos..].starts_with("---") {
            let after = pos + 3;
            if after >= bytes.len()
                || bytes[after] == b'\n'
                || (bytes[after] == b'\r' && bytes.get(after + 1) == Some(&b'\n'))
            {
                return Ok(pos);
            }
        }

        match content[pos..].find('\n') {
            Some(newline_offset) => pos += newline_offset + 1,
            None => break,
        }
    }

    Err(FrontmatterError::MissingClosingDelimiter)
}
