//! Bundle file reading
//!
//! Reading a bundle back must reproduce the ordered task rows it was written
//! from. Column counts are checked strictly by default: rows with differing
//! column counts within one file are a fatal format error naming the file.

use std::fs;
use std::path::Path;
use treeferry_types::{Error, Result, TaskSpec};

/// Options controlling how a bundle or source-list file is read
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Column delimiter
    pub delim: String,
    /// Number of leading header rows to skip (or read, for [`read_header`])
    pub header_rows: usize,
    /// Require a uniform column count across all task rows
    pub ncol_strict: bool,
    /// Minimum allowed column count
    pub ncol_min: Option<usize>,
    /// Maximum allowed column count
    pub ncol_max: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delim: crate::DEFAULT_DELIM.to_string(),
            header_rows: 0,
            ncol_strict: true,
            ncol_min: None,
            ncol_max: None,
        }
    }
}

fn split_row(line: &str, delim: &str) -> Vec<String> {
    line.split(delim).map(|field| field.trim().to_string()).collect()
}

fn check_ncols(rows: &[Vec<String>], options: &ReadOptions, path: &Path) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    if options.ncol_strict && rows.iter().any(|row| row.len() != first.len()) {
        return Err(Error::bundle_format(
            path,
            "inconsistent number of columns across rows",
        ));
    }
    let min = rows.iter().map(Vec::len).min().unwrap_or(0);
    let max = rows.iter().map(Vec::len).max().unwrap_or(0);
    if let Some(ncol_min) = options.ncol_min {
        if min < ncol_min {
            return Err(Error::bundle_format(
                path,
                format!("row has {} column(s), fewer than required minimum {}", min, ncol_min),
            ));
        }
    }
    if let Some(ncol_max) = options.ncol_max {
        if max > ncol_max {
            return Err(Error::bundle_format(
                path,
                format!("row has {} column(s), more than allowed maximum {}", max, ncol_max),
            ));
        }
    }
    Ok(())
}

/// Read the task rows of a bundle file, skipping any header rows
///
/// Blank lines are ignored. Row order is preserved.
pub fn read_bundle(path: &Path, options: &ReadOptions) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::bundle_format(path, format!("reading file: {}", e)))?;
    let rows: Vec<Vec<String>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(options.header_rows)
        .map(|line| split_row(line, &options.delim))
        .collect();
    check_ncols(&rows, options, path)?;
    Ok(rows)
}

/// Read only the leading header rows of a bundle file
pub fn read_header(path: &Path, options: &ReadOptions) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::bundle_format(path, format!("reading file: {}", e)))?;
    let rows: Vec<Vec<String>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(options.header_rows)
        .map(|line| split_row(line, &options.delim))
        .collect();
    Ok(rows)
}

/// Convert raw rows into task specs: one column is a bare source, two
/// columns a (source, destination) pair
pub fn rows_to_task_specs(rows: Vec<Vec<String>>, path: &Path) -> Result<Vec<TaskSpec>> {
    rows.into_iter()
        .map(|row| match row.len() {
            1 => Ok(TaskSpec::SourceOnly(row[0].clone().into())),
            2 => Ok(TaskSpec::SourceDest(row[0].clone().into(), row[1].clone().into())),
            n => Err(Error::bundle_format(
                path,
                format!("task row has {} column(s), expected 1 or 2", n),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_bundles;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};
    use treeferry_types::Task;

    fn file_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_rows_in_order() {
        let f = file_with("/a,/x\n/b,/y\n\n/c,/z\n");
        let rows = read_bundle(f.path(), &ReadOptions::default()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["/a".to_string(), "/x".to_string()],
                vec!["/b".to_string(), "/y".to_string()],
                vec!["/c".to_string(), "/z".to_string()],
            ]
        );
    }

    #[test]
    fn test_ragged_columns_are_fatal() {
        let f = file_with("/a,/x\n/b\n");
        let err = read_bundle(f.path(), &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_ragged_columns_allowed_when_strict_disabled() {
        let f = file_with("/a,/x\n/b\n");
        let options = ReadOptions {
            ncol_strict: false,
            ..Default::default()
        };
        assert_eq!(read_bundle(f.path(), &options).unwrap().len(), 2);
    }

    #[test]
    fn test_ncol_bounds() {
        let f = file_with("/a,/x,/extra\n");
        let options = ReadOptions {
            ncol_max: Some(2),
            ..Default::default()
        };
        assert!(read_bundle(f.path(), &options).is_err());

        let options = ReadOptions {
            ncol_min: Some(2),
            ..Default::default()
        };
        let f = file_with("/a\n");
        assert!(read_bundle(f.path(), &options).is_err());
    }

    #[test]
    fn test_header_rows_skipped_and_readable() {
        let f = file_with("/srcroot,/dstroot\n/a\n/b\n");
        let options = ReadOptions {
            header_rows: 1,
            ..Default::default()
        };
        let header = read_header(f.path(), &options).unwrap();
        assert_eq!(header, vec![vec!["/srcroot".to_string(), "/dstroot".to_string()]]);

        let rows = read_bundle(f.path(), &options).unwrap();
        assert_eq!(rows, vec![vec!["/a".to_string()], vec!["/b".to_string()]]);
    }

    #[test]
    fn test_rows_to_task_specs() {
        let path = Path::new("list.txt");
        let specs = rows_to_task_specs(
            vec![
                vec!["/a".to_string()],
                vec!["/b".to_string(), "/y".to_string()],
            ],
            path,
        )
        .unwrap();
        assert_eq!(specs[0], TaskSpec::SourceOnly("/a".into()));
        assert_eq!(specs[1], TaskSpec::SourceDest("/b".into(), "/y".into()));

        let err = rows_to_task_specs(vec![vec!["a".into(), "b".into(), "c".into()]], path);
        assert!(err.is_err());
    }

    proptest! {
        /// Bundling then re-reading all bundle files in sequence reproduces
        /// the original tasks in their original order.
        #[test]
        fn test_bundle_round_trip(
            paths in proptest::collection::vec("[a-z0-9/_.]{1,24}", 0..40),
            per_bundle in 1usize..9,
        ) {
            let tasks: Vec<Task> = paths
                .iter()
                .map(|p| Task::new(format!("/src/{}", p), format!("/dst/{}", p)))
                .collect();

            let dir = TempDir::new().unwrap();
            let files = write_bundles(&tasks, per_bundle, dir.path(), "rt", ",").unwrap();

            let mut recovered = Vec::new();
            for file in &files {
                let rows = read_bundle(file, &ReadOptions::default()).unwrap();
                for spec in rows_to_task_specs(rows, file).unwrap() {
                    recovered.push(spec.into_task(None).unwrap());
                }
            }
            prop_assert_eq!(recovered, tasks);
        }
    }
}
