//! Transfer method variants
//!
//! The method is a closed variant type selected once at configuration time.
//! Each variant knows its logging verb and, for external commands, which
//! argument order the underlying program expects: link-style primitives such
//! as `mklink` take the new link path before the target, while copy/move
//! style programs take source before destination. Callers always pass
//! `(src, dst)`; the method encapsulates the order.

/// A transfer primitive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMethod {
    /// Copy file contents and timestamps
    Copy,
    /// Move (rename, falling back to copy-and-delete across devices)
    Move,
    /// Create a hard link to the source
    Hardlink,
    /// Create a symbolic link to the source
    Symlink,
    /// Run an external command for each transfer
    Command {
        /// Command template; `{src}` and `{dst}` placeholders are
        /// substituted, otherwise the two paths are appended as arguments
        template: String,
        /// Append the destination before the source (link-style programs)
        dest_first: bool,
    },
}

impl TransferMethod {
    /// Build an external-command method, inferring the argument order from
    /// the program name when it is a known link-style primitive
    pub fn command<S: Into<String>>(template: S) -> Self {
        let template = template.into();
        let program = template.split_whitespace().next().unwrap_or_default();
        let dest_first = matches!(program, "mklink");
        Self::Command {
            template,
            dest_first,
        }
    }

    /// Look up a method by its selector name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "copy" => Some(Self::Copy),
            "move" => Some(Self::Move),
            "link" | "hardlink" => Some(Self::Hardlink),
            "symlink" => Some(Self::Symlink),
            _ => None,
        }
    }

    /// Uppercase gerund used in action logging
    pub fn action_verb(&self) -> &'static str {
        match self {
            Self::Copy => "COPYING",
            Self::Move => "MOVING",
            Self::Hardlink => "HARDLINKING",
            Self::Symlink => "SYMLINKING",
            Self::Command { template, .. } => {
                let program = template.split_whitespace().next().unwrap_or_default();
                match program.rsplit(['/', '\\']).next().unwrap_or(program) {
                    "cp" | "copy" => "COPYING",
                    "mv" | "move" => "MOVING",
                    "ln" | "mklink" => "LINKING",
                    _ => "TRANSFERRING",
                }
            }
        }
    }

    /// Whether an existing destination should be content-compared against the
    /// source before a skip is logged
    ///
    /// Link-style methods check identity via content comparison, not just
    /// path, so a pre-existing correct link is reported as such.
    pub fn is_link_style(&self) -> bool {
        matches!(self, Self::Hardlink | Self::Symlink)
            || matches!(self.action_verb(), "LINKING" | "HARDLINKING" | "SYMLINKING")
    }
}
