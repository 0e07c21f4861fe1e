//! Conversion of wiki-links to standard markdown links.
//!
//! One tokenizing pass over each text span classifies every occurrence once:
//! embeds, wiki-links with alt text, bare wiki-links and standard `.md` links.
//! Fenced code is never touched. Targets are emitted relative to the current
//! file's directory and slugified to match the exported tree.

use crate::infra::{is_external_link, slugify_link_path, slugify_relative_path};
use crate::links::content::map_text;
use crate::links::extract::split_token;
use crate::links::resolve::ResolvedLinkMap;
use regex::{Captures, Regex};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Earliest match wins; at one position an embed outranks a bare wiki-link.
static LINK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"!\[\[([^\]]+)\]\]|\[\[([^|\]]+)\|([^\]]+)\]\]|\[\[([^\]]+)\]\]|\[([^\]]*)\]\(([^)]+\.md)(#[^)]*)?\)",
    )
    .expect("link token regex")
});

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]+)\)").expect("markdown link regex"));

/// Filenames accepted case-insensitively when the exact target is missing.
const INDEX_NAMES: &[&str] = &["index.md", "readme.md", "index.mdx", "readme.mdx"];

/// Result of rewriting one document.
#[derive(Debug)]
pub struct Rewrite {
    /// The rewritten document.
    pub content: String,
    /// Links emitted with a target.
    pub resolved: usize,
    /// Links emitted with an empty target because nothing exists there.
    pub broken: usize,
}

/// Where a link points before it is turned into an href.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// Vault-relative path of a resolved file.
    Vault(String),
    /// Path as written, relative to the current file's directory.
    Relative(String),
}

/// Rewrites links for one file of the vault.
pub struct LinkRewriter<'a> {
    vault_root: &'a Path,
    /// Vault-relative directory of the current file; empty at the root.
    current_dir: &'a str,
    /// Directory the current file is exported to, relative to the export root.
    export_dir: String,
    resolved: &'a ResolvedLinkMap,
}

impl<'a> LinkRewriter<'a> {
    /// Creates a rewriter for the file at vault-relative `current_file`.
    pub fn new(vault_root: &'a Path, current_file: &'a str, resolved: &'a ResolvedLinkMap) -> Self {
        let current_dir = current_file.rsplit_once('/').map_or("", |(dir, _)| dir);
        let exported = slugify_relative_path(current_file);
        let export_dir = exported
            .rsplit_once('/')
            .map_or(String::new(), |(dir, _)| dir.to_string());
        Self {
            vault_root,
            current_dir,
            export_dir,
            resolved,
        }
    }

    /// Converts every link in the text spans of `content`.
    ///
    /// Broken targets degrade to an empty href; rewriting never fails.
    pub fn rewrite(&self, content: &str) -> Rewrite {
        let resolved = Cell::new(0usize);
        let broken = Cell::new(0usize);

        let content = map_text(content, |text| {
            LINK_TOKEN
                .replace_all(text, |caps: &Captures| {
                    let (out, valid) = self.convert(caps);
                    match valid {
                        Some(true) => resolved.set(resolved.get() + 1),
                        Some(false) => broken.set(broken.get() + 1),
                        None => {}
                    }
                    out
                })
                .into_owned()
        });

        Rewrite {
            content,
            resolved: resolved.get(),
            broken: broken.get(),
        }
    }

    /// Returns the replacement and whether it carries a checked target.
    fn convert(&self, caps: &Captures) -> (String, Option<bool>) {
        if let Some(token) = caps.get(1) {
            return self.embed(token.as_str());
        }
        if let (Some(token), Some(alt)) = (caps.get(2), caps.get(3)) {
            return self.wiki_link(token.as_str(), Some(alt.as_str()));
        }
        if let Some(token) = caps.get(4) {
            return self.wiki_link(token.as_str(), None);
        }
        if let (Some(alt), Some(path)) = (caps.get(5), caps.get(6)) {
            let fragment = caps.get(7).map(|m| &m.as_str()[1..]);
            return self.markdown_link(&caps[0], alt.as_str(), path.as_str(), fragment);
        }
        (caps[0].to_string(), None)
    }

    fn embed(&self, token: &str) -> (String, Option<bool>) {
        let (target, fragment) = split_token(token);
        let target = match self.resolved.get(token) {
            Some(path) => Target::Vault(path.clone()),
            None => Target::Relative(target.to_string()),
        };

        if self.is_valid(&target) {
            (format!("![]({})", self.href(&target, fragment)), Some(true))
        } else {
            ("![]()".to_string(), Some(false))
        }
    }

    fn wiki_link(&self, token: &str, alt: Option<&str>) -> (String, Option<bool>) {
        let (target, fragment) = split_token(token);

        if target.is_empty() {
            let fragment = fragment.unwrap_or_default();
            let text = alt.unwrap_or(fragment);
            return (format!("[{}](#{})", text, fragment), None);
        }

        let target = match self.resolved.get(token) {
            Some(path) => Target::Vault(path.clone()),
            None if alt.is_none() && !has_markdown_extension(target) => {
                Target::Relative(format!("{}.md", target))
            }
            None => Target::Relative(target.to_string()),
        };

        let text = match alt {
            Some(alt) => alt.to_string(),
            None => display_name(&target).to_string(),
        };

        if self.is_valid(&target) {
            (format!("[{}]({})", text, self.href(&target, fragment)), Some(true))
        } else {
            (format!("[{}]()", text), Some(false))
        }
    }

    fn markdown_link(
        &self,
        original: &str,
        alt: &str,
        path: &str,
        fragment: Option<&str>,
    ) -> (String, Option<bool>) {
        if is_external_link(path) {
            return (original.to_string(), None);
        }

        let decoded = path.replace("%20", " ");
        let target = match self.resolved.get(&decoded) {
            Some(resolved) => Target::Vault(resolved.clone()),
            None => Target::Relative(decoded),
        };

        if self.is_valid(&target) {
            (format!("[{}]({})", alt, self.href(&target, fragment)), Some(true))
        } else {
            (format!("[{}]()", alt), Some(false))
        }
    }

    /// On-disk location of a target.
    fn disk_path(&self, target: &Target) -> PathBuf {
        match target {
            Target::Vault(path) => self.vault_root.join(path),
            Target::Relative(path) => self.vault_root.join(self.current_dir).join(path),
        }
    }

    fn is_valid(&self, target: &Target) -> bool {
        target_exists(&self.disk_path(target))
    }

    /// Exported href: relative to the current file, slugified, `_index` folded.
    fn href(&self, target: &Target, fragment: Option<&str>) -> String {
        let relative = match target {
            Target::Vault(path) => relative_href(&self.export_dir, &slugify_relative_path(path)),
            Target::Relative(path) => path.clone(),
        };
        let href = strip_index_suffix(&slugify_link_path(&relative));
        match fragment {
            Some(fragment) => format!("{}#{}", href, fragment),
            None => href,
        }
    }
}

/// Re-slugifies every standard markdown link target outside fenced code.
///
/// External URLs, anchors and `.mdx` targets are left alone. Applying the
/// pass twice gives the same result as applying it once.
pub fn slugify_markdown_links(content: &str) -> String {
    map_text(content, |text| {
        MARKDOWN_LINK
            .replace_all(text, |caps: &Captures| {
                format!("{}[{}]({})", &caps[1], &caps[2], slugify_link_path(&caps[3]))
            })
            .into_owned()
    })
}

/// Checks a target on disk, accepting `index`/`readme` in any case.
fn target_exists(path: &Path) -> bool {
    if path.exists() {
        return true;
    }

    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
        return false;
    };
    if !INDEX_NAMES.contains(&name.as_str()) {
        return false;
    }

    let Some(dir) = path.parent() else {
        return false;
    };
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|e| e.file_name().to_string_lossy().to_lowercase() == name)
    })
}

/// Path from vault directory `from_dir` to vault file `to`.
fn relative_href(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').collect();

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count()
        .min(to.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);
    parts.join("/")
}

/// Folds index-file conventions: `x_index.md` becomes `x.md`, `x_index` becomes `x`.
fn strip_index_suffix(path: &str) -> String {
    if let Some(stem) = path.strip_suffix("_index.md") {
        format!("{}.md", stem)
    } else if let Some(stem) = path.strip_suffix("_index") {
        stem.to_string()
    } else {
        path.to_string()
    }
}

fn has_markdown_extension(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

/// Filename of a target without its extension or `_index` suffix.
fn display_name(target: &Target) -> &str {
    let path = match target {
        Target::Vault(p) | Target::Relative(p) => p.as_str(),
    };
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    stem.strip_suffix("_index")
        .filter(|folded| !folded.is_empty())
        .unwrap_or(stem)
}
