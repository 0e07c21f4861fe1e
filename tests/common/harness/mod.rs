//! Test harness for CLI integration tests.
//!
//! Provides isolated vault/export directories, programmatic note creation,
//! and CLI assertion helpers using `assert_cmd`.

mod command;
mod note;
mod vault;

// Re-export main types for external use
#[allow(unused_imports)]
pub use command::VaultCommand;
#[allow(unused_imports)]
pub use note::TestNote;
#[allow(unused_imports)]
pub use vault::TestVault;
