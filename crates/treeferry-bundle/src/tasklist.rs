//! Source-list file parsing
//!
//! A source list comes in one of three shapes, detected from column counts:
//! every row a bare source path, every row a (source, destination) pair, or
//! a single two-column header row naming (source root, destination root)
//! followed by bare source paths under that root. Anything else is a format
//! error naming the file.

use crate::reader::{read_bundle, ReadOptions};
use std::path::{Path, PathBuf};
use treeferry_types::{Error, Result, TaskSpec};

/// A parsed source-list file
#[derive(Debug, Clone)]
pub struct Tasklist {
    /// The file the list was read from
    pub path: PathBuf,
    /// Root-pair header, when the list opened with one: (source root,
    /// destination root)
    pub header: Option<(PathBuf, PathBuf)>,
    /// Task rows in file order
    pub tasks: Vec<TaskSpec>,
}

impl Tasklist {
    /// Load and shape-check a source-list file
    pub fn load(path: &Path, delim: &str) -> Result<Self> {
        let options = ReadOptions {
            delim: delim.to_string(),
            ncol_strict: false,
            ncol_max: Some(2),
            ..Default::default()
        };
        let rows = read_bundle(path, &options)?;

        let mut header = None;
        let mut body = rows.as_slice();
        if rows.len() > 1 && rows[0].len() == 2 && rows[1..].iter().all(|row| row.len() == 1) {
            header = Some((
                PathBuf::from(&rows[0][0]),
                PathBuf::from(&rows[0][1]),
            ));
            body = &rows[1..];
        } else if let Some(first) = rows.first() {
            if rows.iter().any(|row| row.len() != first.len()) {
                return Err(Error::bundle_format(
                    path,
                    "rows mix one and two columns; only a single leading \
                     two-column root-pair header may differ from the rest",
                ));
            }
        }

        let tasks = body
            .iter()
            .map(|row| match row.len() {
                1 => Ok(TaskSpec::SourceOnly(PathBuf::from(&row[0]))),
                2 => Ok(TaskSpec::SourceDest(
                    PathBuf::from(&row[0]),
                    PathBuf::from(&row[1]),
                )),
                n => Err(Error::bundle_format(
                    path,
                    format!("task row has {} column(s), expected 1 or 2", n),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            tasks,
        })
    }

    /// Whether the list carried a root-pair header
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_all_single_column() {
        let f = file_with("/data/a\n/data/b\n");
        let list = Tasklist::load(f.path(), ",").unwrap();
        assert!(list.header.is_none());
        assert_eq!(
            list.tasks,
            vec![
                TaskSpec::SourceOnly("/data/a".into()),
                TaskSpec::SourceOnly("/data/b".into()),
            ]
        );
    }

    #[test]
    fn test_all_source_dest_pairs() {
        let f = file_with("/data/a,/out/a\n/data/b,/out/b\n");
        let list = Tasklist::load(f.path(), ",").unwrap();
        assert!(list.header.is_none());
        assert_eq!(
            list.tasks,
            vec![
                TaskSpec::SourceDest("/data/a".into(), "/out/a".into()),
                TaskSpec::SourceDest("/data/b".into(), "/out/b".into()),
            ]
        );
    }

    #[test]
    fn test_root_pair_header_then_sources() {
        let f = file_with("/data,/out\n/data/a\n/data/b\n");
        let list = Tasklist::load(f.path(), ",").unwrap();
        assert_eq!(
            list.header,
            Some((PathBuf::from("/data"), PathBuf::from("/out")))
        );
        assert_eq!(list.tasks.len(), 2);
        assert_eq!(list.tasks[0], TaskSpec::SourceOnly("/data/a".into()));
    }

    #[test]
    fn test_mixed_columns_rejected() {
        let f = file_with("/data/a\n/data/b,/out/b\n");
        let err = Tasklist::load(f.path(), ",").unwrap_err();
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_three_columns_rejected() {
        let f = file_with("/a,/b,/c\n");
        assert!(Tasklist::load(f.path(), ",").is_err());
    }

    #[test]
    fn test_empty_file() {
        let f = file_with("");
        let list = Tasklist::load(f.path(), ",").unwrap();
        assert!(list.header.is_none());
        assert!(list.tasks.is_empty());
    }

    #[test]
    fn test_single_two_column_row_is_a_pair_not_a_header() {
        let f = file_with("/data/a,/out/a\n");
        let list = Tasklist::load(f.path(), ",").unwrap();
        assert!(list.header.is_none());
        assert_eq!(
            list.tasks,
            vec![TaskSpec::SourceDest("/data/a".into(), "/out/a".into())]
        );
    }
}
