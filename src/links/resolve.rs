//! Fuzzy resolution of wiki-link tokens against the vault file list.
//!
//! A token matches a file when the file's basename contains it, either
//! case-sensitively or after lowercasing both. Tokens with a `/` match by
//! case-insensitive containment in the vault-relative path instead.
//!
//! When several files match, the winner is chosen by:
//! 1. an exact basename or basename-without-extension match (case-insensitive)
//! 2. the shortest vault-relative path
//! 3. the last candidate in sorted path order

use crate::infra::VaultEntry;
use crate::links::extract::split_token;
use std::collections::HashMap;
use tracing::debug;

/// Raw link token to resolved vault-relative path (on-disk case).
pub type ResolvedLinkMap = HashMap<String, String>;

#[derive(Debug, Clone)]
struct Candidate {
    relative: String,
    lower_relative: String,
    basename: String,
    lower_basename: String,
}

/// Build-once lookup over every file in the vault.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    /// Sorted by relative path.
    candidates: Vec<Candidate>,
    /// Lowercase basename and lowercase stem to candidate indices.
    exact: HashMap<String, Vec<usize>>,
}

impl LinkIndex {
    /// Builds an index from vault-relative file paths (`/` separated).
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut relatives: Vec<String> = paths.into_iter().map(Into::into).collect();
        relatives.sort();
        relatives.dedup();

        let mut candidates = Vec::with_capacity(relatives.len());
        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, relative) in relatives.into_iter().enumerate() {
            let basename = basename(&relative).to_string();
            let lower_basename = basename.to_lowercase();

            exact.entry(lower_basename.clone()).or_default().push(i);
            let stem = strip_extension(&lower_basename);
            if !stem.is_empty() && stem != lower_basename {
                exact.entry(stem.to_string()).or_default().push(i);
            }

            candidates.push(Candidate {
                lower_relative: relative.to_lowercase(),
                relative,
                basename,
                lower_basename,
            });
        }

        Self { candidates, exact }
    }

    /// Builds an index from the files of a vault enumeration.
    pub fn from_entries(entries: &[VaultEntry]) -> Self {
        Self::new(entries.iter().filter(|e| e.is_file()).map(|e| e.relative.clone()))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Resolves one link target (no fragment or size suffix) to a vault path.
    ///
    /// # Examples
    ///
    /// ```
    /// use vaultpress::links::LinkIndex;
    ///
    /// let index = LinkIndex::new(["notes/Foo.md", "notes/Foo2.md", "Foobar.md"]);
    /// assert_eq!(index.resolve("Foo"), Some("notes/Foo.md"));
    /// assert_eq!(index.resolve("bar"), Some("Foobar.md"));
    /// assert_eq!(index.resolve("Missing"), None);
    /// ```
    pub fn resolve(&self, target: &str) -> Option<&str> {
        if target.is_empty() {
            return None;
        }
        let lower = target.to_lowercase();

        let winner = if target.contains('/') {
            self.resolve_path_token(&lower)
        } else if let Some(exact) = self.exact.get(&lower) {
            self.pick(exact.iter().copied())
        } else {
            self.pick(self.candidates.iter().enumerate().filter_map(|(i, c)| {
                (c.basename.contains(target) || c.lower_basename.contains(&lower)).then_some(i)
            }))
        };

        winner.map(|i| self.candidates[i].relative.as_str())
    }

    /// Resolves every token, keyed by the raw token.
    ///
    /// Tokens with no match are absent from the result.
    pub fn resolve_links(&self, tokens: &[String]) -> ResolvedLinkMap {
        let mut resolved = ResolvedLinkMap::new();
        for token in tokens {
            if resolved.contains_key(token) {
                continue;
            }
            let (target, _) = split_token(token);
            match self.resolve(target) {
                Some(path) => {
                    debug!(token = %token, path = %path, "resolved link");
                    resolved.insert(token.clone(), path.to_string());
                }
                None => debug!(token = %token, "unresolved link"),
            }
        }
        resolved
    }

    fn resolve_path_token(&self, lower: &str) -> Option<usize> {
        let exact = self.pick(self.candidates.iter().enumerate().filter_map(|(i, c)| {
            (c.lower_relative == lower || strip_extension(&c.lower_relative) == lower)
                .then_some(i)
        }));
        exact.or_else(|| {
            self.pick(
                self.candidates
                    .iter()
                    .enumerate()
                    .filter_map(|(i, c)| c.lower_relative.contains(lower).then_some(i)),
            )
        })
    }

    /// Shortest path wins; among equals the later one in sorted order.
    fn pick(&self, indices: impl Iterator<Item = usize>) -> Option<usize> {
        let mut best: Option<usize> = None;
        for i in indices {
            let len = self.candidates[i].relative.len();
            match best {
                Some(b) if self.candidates[b].relative.len() < len => {}
                _ => best = Some(i),
            }
        }
        best
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Drops the extension of the final path component, if any.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index(paths: &[&str]) -> LinkIndex {
        LinkIndex::new(paths.iter().copied())
    }

    // ===========================================
    // Phase 1: Matching
    // ===========================================

    #[test]
    fn matches_basename_substring() {
        let idx = index(&["notes/Project Plan.md"]);
        assert_eq!(idx.resolve("Plan"), Some("notes/Project Plan.md"));
    }

    #[test]
    fn matches_case_insensitively() {
        let idx = index(&["Notes/Meeting.md"]);
        assert_eq!(idx.resolve("meeting"), Some("Notes/Meeting.md"));
        assert_eq!(idx.resolve("MEETING.MD"), Some("Notes/Meeting.md"));
    }

    #[test]
    fn does_not_match_directory_names_for_plain_tokens() {
        let idx = index(&["Projects/readme.md"]);
        assert_eq!(idx.resolve("Projects"), None);
    }

    #[test]
    fn path_token_matches_relative_path() {
        let idx = index(&["work/Notes/Plan.md", "home/Notes/Plan.md"]);
        assert_eq!(idx.resolve("home/notes/plan"), Some("home/Notes/Plan.md"));
        assert_eq!(idx.resolve("work/Notes/Plan.md"), Some("work/Notes/Plan.md"));
    }

    #[test]
    fn matches_non_markdown_files() {
        let idx = index(&["notes/assets/diagram.png"]);
        assert_eq!(idx.resolve("diagram.png"), Some("notes/assets/diagram.png"));
    }

    #[test]
    fn empty_target_is_unresolved() {
        assert_eq!(index(&["a.md"]).resolve(""), None);
    }

    // ===========================================
    // Phase 2: Ambiguity
    // ===========================================

    #[test]
    fn exact_stem_beats_substring() {
        let idx = index(&["Foo.md", "Foo2.md"]);
        assert_eq!(idx.resolve("Foo"), Some("Foo.md"));
    }

    #[test]
    fn exact_match_beats_shorter_substring() {
        let idx = index(&["a/very/deep/Foo.md", "xFoo.md"]);
        assert_eq!(idx.resolve("foo"), Some("a/very/deep/Foo.md"));
    }

    #[test]
    fn shortest_path_wins_among_substrings() {
        let idx = index(&["deep/nested/Foobar.md", "Foobaz.md"]);
        assert_eq!(idx.resolve("Foob"), Some("Foobaz.md"));
    }

    #[test]
    fn equal_length_ties_go_to_last_sorted() {
        let idx = index(&["b/Note.md", "a/Note.md"]);
        assert_eq!(idx.resolve("Note"), Some("b/Note.md"));
    }

    #[test]
    fn resolution_is_stable_across_builds() {
        let first = index(&["Foo2.md", "x/Foo.md", "Foo.md"]);
        let second = index(&["Foo.md", "Foo2.md", "x/Foo.md"]);
        assert_eq!(first.resolve("Foo"), second.resolve("Foo"));
        assert_eq!(first.resolve("Foo"), Some("Foo.md"));
    }

    // ===========================================
    // Phase 3: resolve_links
    // ===========================================

    #[test]
    fn resolve_links_keys_by_raw_token() {
        let idx = index(&["Note.md", "assets/pic.png"]);
        let tokens = vec![
            "Note#Intro".to_string(),
            "pic.png|200".to_string(),
            "Nope".to_string(),
        ];
        let map = idx.resolve_links(&tokens);

        assert_eq!(map.get("Note#Intro").map(String::as_str), Some("Note.md"));
        assert_eq!(map.get("pic.png|200").map(String::as_str), Some("assets/pic.png"));
        assert!(!map.contains_key("Nope"));
    }

    #[test]
    fn strip_extension_only_touches_last_component() {
        assert_eq!(strip_extension("a.b/c"), "a.b/c");
        assert_eq!(strip_extension("a/c.md"), "a/c");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }
}
