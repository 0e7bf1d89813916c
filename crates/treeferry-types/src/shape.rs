//! Tree-shape policies for directory transfers
//!
//! When a source directory is copied into a destination directory, the
//! destination can either mirror the source directory's *contents* directly
//! (sync) or gain a new subdirectory named after the source (transplant).

/// How a source directory's contents land inside the destination directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeShape {
    /// Contents of the source directory land directly inside the destination
    Sync,
    /// A directory bearing the source's basename is created under the
    /// destination, and contents nest inside that
    Transplant,
}

const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

impl TreeShape {
    /// Resolve the shape for one source path
    ///
    /// When neither sync nor transplant was explicitly requested, a source
    /// path written with a trailing path separator is treated as sync and
    /// one without as transplant.
    pub fn resolve(raw_source: &str, explicit: Option<TreeShape>) -> TreeShape {
        match explicit {
            Some(shape) => shape,
            None => {
                if raw_source.ends_with(PATH_SEPARATORS) {
                    TreeShape::Sync
                } else {
                    TreeShape::Transplant
                }
            }
        }
    }
}

/// Strip any trailing path separators from a raw source path string
pub fn trim_trailing_separators(raw: &str) -> &str {
    raw.trim_end_matches(PATH_SEPARATORS)
}
