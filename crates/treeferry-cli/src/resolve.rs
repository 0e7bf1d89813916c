//! Task resolution
//!
//! Turns the argument surface into a flat, fully-adjusted task list. Every
//! destination is standardized to sync-style here: transplant-style sources
//! get their basename appended to the destination before queuing, so
//! everything downstream (direct execution, bundles, child jobs) treats
//! tasks uniformly.

use crate::args::Cli;
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::debug;
use treeferry_bundle::Tasklist;
use treeferry_types::{trim_trailing_separators, Error, Result, Task, TaskSpec, TreeShape};

fn basename(raw: &str) -> &str {
    Path::new(trim_trailing_separators(raw))
        .file_name()
        .map(|name| name.to_str().unwrap_or(raw))
        .unwrap_or(raw)
}

fn ends_with_separator(raw: &str) -> bool {
    raw.ends_with(['/', '\\'])
}

/// Standardize one (source, destination) pair
///
/// A file source lands inside a directory destination under its own name,
/// unless `dst_can_be_file` allows the destination to be the exact file
/// path. A directory source resolved to transplant shape gets its basename
/// appended to the destination.
fn adjust_dst_path(
    raw_src: &str,
    raw_dst: &str,
    dst_can_be_file: bool,
    explicit_shape: Option<TreeShape>,
    default_shape: Option<TreeShape>,
) -> Result<PathBuf> {
    let src = Path::new(trim_trailing_separators(raw_src));
    let dst = Path::new(raw_dst);

    if src.is_file() {
        if dst.is_dir() || ends_with_separator(raw_dst) {
            return Ok(dst.join(basename(raw_src)));
        }
        if dst.is_file() || dst_can_be_file {
            return Ok(dst.to_path_buf());
        }
        return Ok(dst.join(basename(raw_src)));
    }

    // Directory (or not-yet-verified) source.
    if dst.is_file() {
        return Err(Error::config(format!(
            "source directory ({}) cannot overwrite existing destination file ({})",
            raw_src, raw_dst
        )));
    }
    let shape = match explicit_shape.or(default_shape) {
        Some(shape) => shape,
        None => TreeShape::resolve(raw_src, None),
    };
    match shape {
        TreeShape::Sync => Ok(dst.to_path_buf()),
        TreeShape::Transplant => Ok(dst.join(basename(raw_src))),
    }
}

/// Expand one source-list row source through `*` globbing when enabled
fn expand_src(raw_src: &str, noglob: bool) -> Vec<String> {
    if noglob || !raw_src.contains('*') {
        return vec![raw_src.to_string()];
    }
    match glob(raw_src) {
        Ok(paths) => {
            let expanded: Vec<String> = paths
                .filter_map(|entry| entry.ok())
                .map(|path| path.display().to_string())
                .collect();
            debug!("glob '{}' expanded to {} path(s)", raw_src, expanded.len());
            expanded
        }
        Err(_) => vec![raw_src.to_string()],
    }
}

fn resolve_srclist(cli: &Cli, file: &Path, tasks: &mut Vec<Task>) -> Result<()> {
    let list = Tasklist::load(file, &cli.srclist_delim)?;

    let list_dst = if cli.dstdir_global.is_some() {
        cli.dstdir_global.clone()
    } else {
        list.header
            .as_ref()
            .map(|(_, dst_dir)| dst_dir.display().to_string())
    };

    for spec in &list.tasks {
        let (raw_src, row_dst) = match spec {
            TaskSpec::SourceOnly(src) => (src.display().to_string(), None),
            TaskSpec::SourceDest(src, dst) => {
                (src.display().to_string(), Some(dst.display().to_string()))
            }
        };
        // A destination named by the row itself may be an exact file path;
        // a shared list destination is always a directory.
        let row_dst_can_be_file = list_dst.is_none();
        let dst = match (&list_dst, row_dst) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dst)) => dst,
            (None, None) => {
                return Err(Error::bundle_format(
                    file,
                    format!("no destination available for source '{}'", raw_src),
                ));
            }
        };
        for src in expand_src(&raw_src, cli.srclist_noglob) {
            // Glob-expanded directories default to transplant so siblings
            // cannot merge into one destination.
            let default_shape = if raw_src.contains('*') && !cli.srclist_noglob {
                Some(TreeShape::Transplant)
            } else {
                None
            };
            let adjusted = adjust_dst_path(
                &src,
                &dst,
                row_dst_can_be_file,
                cli.explicit_shape(),
                default_shape,
            )?;
            tasks.push(Task::new(trim_trailing_separators(&src), adjusted));
        }
    }
    Ok(())
}

fn resolve_srclist_rooted(cli: &Cli, file: &Path, tasks: &mut Vec<Task>) -> Result<()> {
    let list = Tasklist::load(file, &cli.srclist_delim)?;
    let Some((src_root, header_dst_root)) = &list.header else {
        return Err(Error::bundle_format(
            file,
            "rooted source list must open with a 'src_rootdir,dst_rootdir' header row",
        ));
    };
    if !src_root.is_dir() {
        return Err(Error::config(format!(
            "source root directory in header of {} must be an existing directory: {}",
            file.display(),
            src_root.display()
        )));
    }

    let mut dst_root = match &cli.dstdir_global {
        Some(dir) => PathBuf::from(dir),
        None => header_dst_root.clone(),
    };
    if dst_root.is_file() {
        return Err(Error::config(format!(
            "destination root directory of {} cannot be an existing file: {}",
            file.display(),
            dst_root.display()
        )));
    }

    // Rooted lists mirror structure below the source root; transplant adds
    // the root's own name as one extra level.
    let src_root_str = src_root.display().to_string();
    if cli.explicit_shape() == Some(TreeShape::Transplant) {
        dst_root = dst_root.join(basename(&src_root_str));
    }

    for spec in &list.tasks {
        let TaskSpec::SourceOnly(src) = spec else {
            return Err(Error::bundle_format(
                file,
                "rooted source list rows must carry a single source column",
            ));
        };
        let raw_src = src.display().to_string();
        for src in expand_src(&raw_src, cli.srclist_noglob) {
            let rel = match src.strip_prefix(&src_root_str) {
                Some(rel) => rel.trim_start_matches(['/', '\\']).to_string(),
                None => src.clone(),
            };
            let abs_src = if Path::new(&src).is_absolute() {
                PathBuf::from(trim_trailing_separators(&src))
            } else {
                src_root.join(trim_trailing_separators(&src))
            };
            tasks.push(Task::new(abs_src, dst_root.join(trim_trailing_separators(&rel))));
        }
    }
    Ok(())
}

/// Resolve the full argument surface into a flat task list
///
/// Every returned task has a sync-style destination and a source that is
/// verified to exist.
pub fn resolve_tasks(cli: &Cli) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();

    if !cli.src.is_empty() {
        let dst = cli
            .global_dst()
            .ok_or_else(|| Error::config("--dst or --dstdir-global is required with --src"))?;
        let dst_can_be_file = cli.src.len() == 1
            && cli.dst.is_some()
            && !Path::new(dst).is_dir()
            && cli.srclist.is_empty()
            && cli.srclist_rooted.is_empty();
        for raw_src in &cli.src {
            let adjusted =
                adjust_dst_path(raw_src, dst, dst_can_be_file, cli.explicit_shape(), None)?;
            tasks.push(Task::new(trim_trailing_separators(raw_src), adjusted));
        }
    }

    for file in &cli.srclist {
        resolve_srclist(cli, file, &mut tasks)?;
    }
    for file in &cli.srclist_rooted {
        resolve_srclist_rooted(cli, file, &mut tasks)?;
    }

    let missing: Vec<String> = tasks
        .iter()
        .filter(|task| !task.source.exists())
        .map(|task| task.source.display().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::config(format!(
            "source paths do not exist:\n{}",
            missing.join("\n")
        )));
    }

    Ok(tasks)
}
