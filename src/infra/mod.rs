//! Infrastructure: slugs, hashing, frontmatter, ignore rules, file I/O

pub mod content_hash;
pub mod frontmatter;
pub mod fs;
pub mod ignore;
pub mod slug;

pub use content_hash::{ContentHash, ContentHashError};
pub use frontmatter::{
    DEFAULT_REQUIRED_KEYS, FrontmatterError, contains_required_keys, extract_frontmatter,
    has_required_keys,
};
pub use fs::{
    EntryType, FsError, VaultEntry, copy_file, join_within, modified_seconds, read_text,
    remove_export, scan_vault, write_atomic,
};
pub use ignore::{IGNORE_FILE_NAME, IgnoreError, IgnoreRules};
pub use slug::{
    is_external_link, slugify, slugify_filename, slugify_link_path, slugify_path,
    slugify_relative_path,
};
