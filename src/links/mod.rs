//! Link engine: extraction, resolution and rewriting of wiki-links.

pub mod content;
pub mod extract;
pub mod resolve;
pub mod rewrite;

pub use content::{ContentPart, map_text, split_code_blocks};
pub use extract::{extract_links, split_token};
pub use resolve::{LinkIndex, ResolvedLinkMap};
pub use rewrite::{LinkRewriter, Rewrite, slugify_markdown_links};
