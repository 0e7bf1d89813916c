//! Task bundling and source-list parsing
//!
//! A bundle is a fixed-size chunk of copy tasks serialized to a
//! delimiter-separated text file, written once by the submitting process and
//! read once by the cluster job it spawns. The same row format backs
//! user-supplied source-list files, which may open with header lines
//! carrying a shared destination root.

pub mod reader;
pub mod tasklist;
pub mod writer;

pub use reader::{read_bundle, rows_to_task_specs, ReadOptions};
pub use tasklist::Tasklist;
pub use writer::{index_width, plan_bundles, write_bundles};

/// Default column delimiter for bundle and source-list files
pub const DEFAULT_DELIM: &str = ",";
