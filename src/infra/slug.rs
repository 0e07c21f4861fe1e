//! Slug generation for exported paths and link targets.

/// Link prefixes that are never rewritten.
const EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "tel:", "ftp://"];

/// Converts text to a URL-friendly slug.
///
/// - Converts to lowercase
/// - Drops everything except `a-z`, `0-9`, `_`, `-` and ASCII whitespace
/// - Replaces whitespace runs with a single hyphen
/// - Collapses consecutive hyphens
/// - Trims leading/trailing hyphens
///
/// The transform is idempotent: `slugify(&slugify(x)) == slugify(x)`.
///
/// # Examples
///
/// ```
/// use vaultpress::infra::slugify;
///
/// assert_eq!(slugify("API Design"), "api-design");
/// assert_eq!(slugify("Hello World!"), "hello-world");
/// assert_eq!(slugify(""), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();

    let mut kept = String::with_capacity(lower.len());
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            kept.push(c);
        } else if c.is_ascii_whitespace() {
            kept.push('-');
        }
    }

    // Collapse consecutive hyphens
    let mut collapsed = String::with_capacity(kept.len());
    let mut prev_was_hyphen = false;
    for c in kept.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                collapsed.push(c);
            }
            prev_was_hyphen = true;
        } else {
            collapsed.push(c);
            prev_was_hyphen = false;
        }
    }

    collapsed.trim_matches('-').to_string()
}

/// Slugifies a filename, leaving its extension untouched.
///
/// The extension is everything from the last `.` onward, so `Report.Final.PDF`
/// becomes `reportfinal.PDF`.
pub fn slugify_filename(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) => format!("{}{}", slugify(&name[..dot]), &name[dot..]),
        None => slugify(name),
    }
}

/// Slugifies each `/`-separated component of a path.
///
/// Directory components are slugified whole, the final component keeps its
/// extension. `.`, `..` and empty components pass through unchanged.
/// Components that slugify to nothing (`日本`, `🎉`) are dropped, so a
/// relative path never turns into an absolute one.
///
/// # Examples
///
/// ```
/// use vaultpress::infra::slugify_path;
///
/// assert_eq!(slugify_path("日本/My Note.md"), "my-note.md");
/// ```
pub fn slugify_path(path: &str) -> String {
    let components: Vec<&str> = path.split('/').collect();
    let last = components.len().saturating_sub(1);

    components
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            let slugged = match *part {
                "" | "." | ".." => return Some((*part).to_string()),
                _ if i == last => slugify_filename(part),
                _ => slugify(part),
            };
            (!slugged.is_empty()).then_some(slugged)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a leading run of `../` markers from a path.
///
/// Returns `(prefix, remainder)` where `prefix` is the literal `../../` text.
pub fn split_parent_prefix(path: &str) -> (&str, &str) {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    path.split_at(path.len() - rest.len())
}

/// Slugifies a relative path, keeping any leading `../` prefix verbatim.
///
/// `.mdx` paths are returned unchanged.
pub fn slugify_relative_path(path: &str) -> String {
    if is_mdx(path) {
        return path.to_string();
    }
    let (prefix, rest) = split_parent_prefix(path);
    format!("{}{}", prefix, slugify_path(rest))
}

/// Slugifies a markdown link target.
///
/// - External URLs and bare `#anchor` references pass through unchanged
/// - A trailing `#fragment` is split off and reattached verbatim
/// - `%20` is decoded to a space before slugifying
/// - `.mdx` targets are not slugified
///
/// # Examples
///
/// ```
/// use vaultpress::infra::slugify_link_path;
///
/// assert_eq!(slugify_link_path("../../db/My Table.md#Rows"), "../../db/my-table.md#Rows");
/// assert_eq!(slugify_link_path("https://example.com/A B"), "https://example.com/A B");
/// ```
pub fn slugify_link_path(link: &str) -> String {
    if link.starts_with('#') || is_external_link(link) {
        return link.to_string();
    }

    let (path, fragment) = match link.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (link, None),
    };

    let slugged = if is_mdx(path) {
        path.to_string()
    } else {
        slugify_relative_path(&path.replace("%20", " "))
    };

    match fragment {
        Some(fragment) => format!("{}#{}", slugged, fragment),
        None => slugged,
    }
}

/// Checks if a link target is an absolute URL or other non-path scheme.
pub fn is_external_link(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    EXTERNAL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_mdx(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".mdx")
}
