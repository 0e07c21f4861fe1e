//! Partitioning of a document into fenced code and ordinary text.

use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("fenced block regex"));

/// One contiguous span of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPart<'a> {
    /// A fenced block, both fences included. Never rewritten.
    Code(&'a str),
    /// Everything outside fenced blocks.
    Text(&'a str),
}

impl<'a> ContentPart<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            ContentPart::Code(s) | ContentPart::Text(s) => s,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, ContentPart::Code(_))
    }
}

/// Splits a document into code and text spans.
///
/// Concatenating the spans in order reproduces `content` exactly. An unpaired
/// trailing fence is treated as text.
pub fn split_code_blocks(content: &str) -> Vec<ContentPart<'_>> {
    let mut parts = Vec::new();
    let mut last_end = 0;

    for m in FENCED_BLOCK.find_iter(content) {
        if m.start() > last_end {
            parts.push(ContentPart::Text(&content[last_end..m.start()]));
        }
        parts.push(ContentPart::Code(m.as_str()));
        last_end = m.end();
    }

    if last_end < content.len() {
        parts.push(ContentPart::Text(&content[last_end..]));
    }

    parts
}

/// Applies `transform` to every text span, copying code spans verbatim.
pub fn map_text<F>(content: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(content.len());
    for part in split_code_blocks(content) {
        match part {
            ContentPart::Code(code) => out.push_str(code),
            ContentPart::Text(text) => out.push_str(&transform(text)),
        }
    }
    out
}
