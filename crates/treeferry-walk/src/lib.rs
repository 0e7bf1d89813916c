//! Filterable directory-tree traversal and transfer
//!
//! The walker descends a source directory within depth bounds, screens
//! entries through name filters, mirrors the matching structure into a
//! destination tree, and hands each qualifying file to a transfer strategy.
//! Traversal is an explicit work-stack iterator: parents come before
//! children, siblings in listing order, and dropping the iterator terminates
//! the walk early. With no destination configured the same iterator acts as
//! a pure listing walk.

pub mod options;
pub mod walker;

pub use options::WalkOptions;
pub use walker::{WalkEntry, WalkIter, Walker};
