//! Copy-task data model
//!
//! A task is an ordered (source, destination) pair. Task rows parsed from
//! source-list files may carry only a source column; those are represented
//! by [`TaskSpec::SourceOnly`] and normalized to a full [`Task`] as soon as
//! the shared destination is known, so nothing downstream has to guess.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A task row as parsed, before destination resolution
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskSpec {
    /// Only a source path was given; the destination comes from elsewhere
    SourceOnly(PathBuf),
    /// Both source and destination were given
    SourceDest(PathBuf, PathBuf),
}

impl TaskSpec {
    /// Normalize into a full task, supplying `default_dest` when the row
    /// carried no destination of its own
    pub fn into_task(self, default_dest: Option<&Path>) -> Result<Task> {
        match self {
            TaskSpec::SourceDest(source, dest) => Ok(Task::new(source, dest)),
            TaskSpec::SourceOnly(source) => match default_dest {
                Some(dest) => Ok(Task::new(source, dest)),
                None => Err(Error::config(format!(
                    "no destination available for source '{}'",
                    source.display()
                ))),
            },
        }
    }

    /// The source path of this spec
    pub fn source(&self) -> &Path {
        match self {
            TaskSpec::SourceOnly(source) | TaskSpec::SourceDest(source, _) => source,
        }
    }
}

/// A resolved copy task: immutable once queued, consumed exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    /// Source path; must exist at resolution time
    pub source: PathBuf,
    /// Destination path; may not exist yet
    pub dest: PathBuf,
}

impl Task {
    /// Create a new task
    pub fn new<P1: Into<PathBuf>, P2: Into<PathBuf>>(source: P1, dest: P2) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Verify the source path exists, as required at resolution time
    pub fn verify_source(&self) -> Result<()> {
        if self.source.exists() {
            Ok(())
        } else {
            Err(Error::SourceMissing {
                path: self.source.clone(),
            })
        }
    }

    /// Render the task as one delimiter-separated bundle row
    pub fn to_row(&self, delim: &str) -> String {
        format!(
            "{}{}{}",
            self.source.display(),
            delim,
            self.dest.display()
        )
    }
}
