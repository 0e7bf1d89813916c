//! Walk configuration
//!
//! Options are immutable once a walk begins. Depth counts a directory's
//! direct children as depth 1; the source root itself is not separately
//! yielded.

use treeferry_filter::{NameFilter, RenameRules};

/// Configuration for one walker instance
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Minimum depth at which directories yield entries and files transfer
    pub mindepth: u32,
    /// Maximum traversal depth; `None` is unbounded
    pub maxdepth: Option<u32>,
    /// Depth bound below a matching ancestor directory beyond which
    /// directory-name matching no longer restricts which files are copied;
    /// `None` is unbounded
    pub dir_match_maxdepth: Option<u32>,
    /// Include/exclude filter applied to file names
    pub file_filter: NameFilter,
    /// Include/exclude filter applied to directory names
    pub dir_filter: NameFilter,
    /// Rename rules applied to file names on copy
    pub file_renames: RenameRules,
    /// Rename rules applied to mirrored directory names
    pub dir_renames: RenameRules,
    /// Flatten files from every depth into the single destination directory
    pub collapse: bool,
    /// Create each destination directory lazily on its first qualifying file
    /// instead of eagerly when the directory is visited
    pub mkdir_on_first_file: bool,
}

impl WalkOptions {
    /// Options with no filters and unbounded depth
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum depth
    pub fn mindepth(mut self, depth: u32) -> Self {
        self.mindepth = depth;
        self
    }

    /// Set the maximum depth
    pub fn maxdepth(mut self, depth: u32) -> Self {
        self.maxdepth = Some(depth);
        self
    }

    /// Set the directory-match max depth
    pub fn dir_match_maxdepth(mut self, depth: u32) -> Self {
        self.dir_match_maxdepth = Some(depth);
        self
    }

    /// Set the file name filter
    pub fn file_filter(mut self, filter: NameFilter) -> Self {
        self.file_filter = filter;
        self
    }

    /// Set the directory name filter
    pub fn dir_filter(mut self, filter: NameFilter) -> Self {
        self.dir_filter = filter;
        self
    }

    /// Set the file rename rules
    pub fn file_renames(mut self, rules: RenameRules) -> Self {
        self.file_renames = rules;
        self
    }

    /// Set the directory rename rules
    pub fn dir_renames(mut self, rules: RenameRules) -> Self {
        self.dir_renames = rules;
        self
    }

    /// Enable collapse mode
    pub fn collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    /// Enable lazy destination-directory creation
    pub fn mkdir_on_first_file(mut self, lazy: bool) -> Self {
        self.mkdir_on_first_file = lazy;
        self
    }

    /// Whether `depth` lies within the configured yield window
    pub(crate) fn in_depth_window(&self, depth: u32) -> bool {
        depth >= self.mindepth && self.maxdepth.map_or(true, |max| depth <= max)
    }
}
