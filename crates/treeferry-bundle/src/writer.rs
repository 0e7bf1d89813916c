//! Bundle file writing
//!
//! Tasks are split into contiguous chunks and each chunk lands in one text
//! file named `{prefix}_{timestamp}_{index}.txt`, the index zero-padded to
//! `max(3, digits(total))`. An empty task list still yields a single empty
//! bundle file so a submission batch is never silently empty.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use treeferry_types::{Error, Result, Task};

/// Zero-pad width for a sequence of `total` bundle indices
pub fn index_width(total: usize) -> usize {
    std::cmp::max(3, total.to_string().len())
}

fn bundle_paths(task_count: usize, tasks_per_bundle: usize, dest_dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let total = std::cmp::max(1, task_count.div_ceil(tasks_per_bundle));
    let width = index_width(total);
    (1..=total)
        .map(|index| {
            dest_dir.join(format!(
                "{}_{}_{:0>width$}.txt",
                prefix,
                timestamp,
                index,
                width = width
            ))
        })
        .collect()
}

/// Compute the bundle file paths `write_bundles` would produce, without
/// touching the filesystem. Used by dry-run submission.
pub fn plan_bundles(
    tasks: &[Task],
    tasks_per_bundle: usize,
    dest_dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    if tasks_per_bundle == 0 {
        return Err(Error::config("tasks per bundle must be >= 1"));
    }
    Ok(bundle_paths(tasks.len(), tasks_per_bundle, dest_dir, prefix))
}

/// Write `tasks` into bundle files of `tasks_per_bundle` rows each
///
/// Returns the bundle file paths in sequence order. The last bundle may hold
/// fewer tasks.
pub fn write_bundles(
    tasks: &[Task],
    tasks_per_bundle: usize,
    dest_dir: &Path,
    prefix: &str,
    delim: &str,
) -> Result<Vec<PathBuf>> {
    if tasks_per_bundle == 0 {
        return Err(Error::config("tasks per bundle must be >= 1"));
    }
    fs::create_dir_all(dest_dir)?;

    let bundle_files = bundle_paths(tasks.len(), tasks_per_bundle, dest_dir, prefix);
    info!(
        "writing {} task bundle file(s) in directory: {}",
        bundle_files.len(),
        dest_dir.display()
    );

    for (index, bundle_file) in bundle_files.iter().enumerate() {
        let chunk = tasks.chunks(tasks_per_bundle).nth(index).unwrap_or(&[]);
        let mut body = String::new();
        for task in chunk {
            body.push_str(&task.to_row(delim));
            body.push('\n');
        }
        fs::write(bundle_file, body)?;
    }
    Ok(bundle_files)
}
