//! Wiki-link token extraction.

use regex::Regex;
use std::sync::LazyLock;

/// Recognizes, in order of preference at one position: embeds, `.md` links
/// with alt text, links with alt text, bare `.md` links and bare links.
static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"!\[\[([^\]]+)\]\]|\[\[([^|\]]+\.md)\|([^\]]+)\]\]|\[\[([^|\]]+)\|([^\]]+)\]\]|\[\[([^|\]]+\.md)\]\]|\[\[([^\]]+)\]\]",
    )
    .expect("wiki link regex")
});

/// Capture groups holding the link token for each alternative.
const TOKEN_GROUPS: [usize; 5] = [1, 2, 4, 6, 7];

/// Extracts raw link tokens in document order, duplicates retained.
///
/// The token is the text before any `|` alt text; for embeds it is the whole
/// inner text (including an optional `|size` suffix).
///
/// # Examples
///
/// ```
/// use vaultpress::links::extract_links;
///
/// let tokens = extract_links("See [[Note|this]] and ![[pic.png]] and [[Note]].");
/// assert_eq!(tokens, vec!["Note", "pic.png", "Note"]);
/// ```
pub fn extract_links(content: &str) -> Vec<String> {
    WIKI_LINK
        .captures_iter(content)
        .filter_map(|caps| {
            TOKEN_GROUPS
                .iter()
                .find_map(|&i| caps.get(i))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Splits a token into its target and `#fragment`.
///
/// An embed size suffix (`pic.png|300`) is dropped from the target.
pub fn split_token(token: &str) -> (&str, Option<&str>) {
    let token = token.split('|').next().unwrap_or(token);
    match token.split_once('#') {
        Some((target, fragment)) => (target.trim(), Some(fragment)),
        None => (token.trim(), None),
    }
}
