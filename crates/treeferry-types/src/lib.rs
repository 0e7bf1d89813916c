//! Core type system and error handling for Treeferry
//!
//! This crate defines the shared vocabulary of the workspace: the error
//! taxonomy, the copy-task data model, and the tree-shape policies that
//! decide how a source directory lands inside a destination directory.

pub mod error;
pub mod shape;
pub mod task;

pub use error::{Error, ErrorKind, Result};
pub use shape::{trim_trailing_separators, TreeShape};
pub use task::{Task, TaskSpec};
