//! Version Comparator
//!
//! Ordering of free-form plugin version strings and IDE build numbers.
//!
//! - `token`: version string tokenization and newest-of-two selection
//! - `build`: build number comparison and compatibility windows
//!
//! Everything here is pure and safe to call from any number of tasks.

pub mod build;
pub mod token;

// Re-exports
pub use build::{is_build_older, is_compatible, BuildNumber, CompatibilityWindow, SNAPSHOT_VALUE};
pub use token::{pick_newest, tokenize, Ordinal, TokenSequence, VersionToken};
