//! Name filtering and rename rules for Treeferry tree traversal
//!
//! Directory and file names encountered during a walk are screened against
//! include/exclude pattern sets and optionally rewritten by ordered rename
//! rules before they reach the destination tree. Patterns can be given as
//! shell-style globs (translated to anchored regexes) or as raw regexes.

pub mod filter;
pub mod glob;
pub mod rename;

pub use filter::{FilterSpec, NameFilter};
pub use glob::glob_to_regex;
pub use rename::RenameRules;
