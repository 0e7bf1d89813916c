//! Work-stack tree walker
//!
//! Each stack frame is one source directory together with its computed
//! destination, depth, and directory-match state. Popping a frame lists the
//! directory once, partitions and filters its entries, transfers qualifying
//! files, pushes child frames, and yields the directory's filtered listing.

use crate::options::WalkOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use treeferry_transfer::Transfer;
use treeferry_types::{Error, Result, TreeShape};

/// Directory-match state carried down the tree
///
/// Once a directory matches the directory filter, its descendants remain
/// eligible for file transfer for `dir_match_maxdepth` further levels; a
/// descendant that matches on its own resets the distance. No files are
/// copied below a matching ancestor's match depth bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirMatchState {
    /// Directory matching is not restricting file transfer at all
    Untracked,
    /// No ancestor (nor the directory itself) has matched yet
    Unmatched,
    /// Levels below the nearest matching directory, counting that directory
    /// itself as 1
    Matched(u32),
}

impl DirMatchState {
    fn passes(self, bound: Option<u32>) -> bool {
        match self {
            Self::Untracked => true,
            Self::Unmatched => false,
            Self::Matched(distance) => bound.map_or(true, |b| distance <= b),
        }
    }

    fn child(self, name_passes: bool) -> Self {
        match (self, name_passes) {
            (Self::Untracked, _) => Self::Untracked,
            (_, true) => Self::Matched(1),
            (Self::Unmatched, false) => Self::Unmatched,
            (Self::Matched(distance), false) => Self::Matched(distance + 1),
        }
    }
}

/// One directory's filtered listing, the externally observable result of
/// visiting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// The visited source directory
    pub dir: PathBuf,
    /// Filtered subdirectory names, in listing order
    pub subdirs: Vec<String>,
    /// Filtered file names, in listing order; empty when the directory did
    /// not pass directory matching
    pub files: Vec<String>,
}

impl WalkEntry {
    /// Full paths of the filtered files
    pub fn file_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(move |name| self.dir.join(name))
    }

    /// Full paths of the filtered subdirectories
    pub fn subdir_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.subdirs.iter().map(move |name| self.dir.join(name))
    }
}

#[derive(Debug)]
struct Frame {
    src: PathBuf,
    dst: Option<PathBuf>,
    /// Depth of this directory's direct children; 1 for the source root
    depth: u32,
    state: DirMatchState,
}

/// Recursive, filterable traversal-and-transfer engine
#[derive(Debug)]
pub struct Walker {
    options: WalkOptions,
    transfer: Option<Transfer>,
}

impl Walker {
    /// A walker with no transfer configured: pure listing mode
    pub fn new(options: WalkOptions) -> Self {
        Self {
            options,
            transfer: None,
        }
    }

    /// A walker that hands each qualifying file to `transfer`
    pub fn with_transfer(options: WalkOptions, transfer: Transfer) -> Self {
        Self {
            options,
            transfer: Some(transfer),
        }
    }

    /// The walk configuration
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// The configured transfer, if any
    pub fn transfer(&self) -> Option<&Transfer> {
        self.transfer.as_ref()
    }

    /// Start a walk of `source`, mirroring into `dest` when given
    ///
    /// A nonexistent source directory is a configuration error raised here,
    /// before traversal starts. Under [`TreeShape::Transplant`] a directory
    /// bearing the source's basename is appended to the destination; under
    /// [`TreeShape::Sync`] the source's contents land directly in `dest`.
    pub fn walk(
        &self,
        source: &Path,
        dest: Option<&Path>,
        shape: TreeShape,
    ) -> Result<WalkIter<'_>> {
        if !source.is_dir() {
            return Err(Error::SourceMissing {
                path: source.to_path_buf(),
            });
        }

        let mut dest_root = dest.map(Path::to_path_buf);
        if let (Some(root), TreeShape::Transplant) = (&mut dest_root, shape) {
            if let Some(name) = source.file_name() {
                root.push(name);
            }
        }

        let copying = self.transfer.is_some() && dest_root.is_some();
        // Directory matching restricts file transfer only when directory
        // patterns exist and either a copy is configured or an explicit
        // match depth bound was given; otherwise the filter merely trims
        // the yielded listings.
        let tracked = !self.options.dir_filter.is_empty()
            && (copying || self.options.dir_match_maxdepth.is_some());
        let root_state = if tracked {
            DirMatchState::Unmatched
        } else {
            DirMatchState::Untracked
        };

        debug!(
            "starting walk: {} -> {:?} (shape {:?}, tracked {})",
            source.display(),
            dest_root.as_ref().map(|p| p.display().to_string()),
            shape,
            tracked
        );

        Ok(WalkIter {
            walker: self,
            tracked,
            stack: vec![Frame {
                src: source.to_path_buf(),
                dst: dest_root,
                depth: 1,
                state: root_state,
            }],
            done: false,
        })
    }
}

/// Iterator over visited directories, parent before children, siblings in
/// listing order
///
/// A transfer error ends the iteration after being yielded; dropping the
/// iterator terminates the walk early.
#[derive(Debug)]
pub struct WalkIter<'a> {
    walker: &'a Walker,
    tracked: bool,
    stack: Vec<Frame>,
    done: bool,
}

impl WalkIter<'_> {
    fn visit(&mut self, frame: Frame) -> Result<Option<WalkEntry>> {
        let opts = &self.walker.options;

        // The source root's own name is tested once, at the top of the walk.
        let mut state = frame.state;
        if frame.depth == 1 && state == DirMatchState::Unmatched {
            let root_name = frame
                .src
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if opts.dir_filter.accepts(&root_name) {
                state = DirMatchState::Matched(1);
            }
        }
        let passes = state.passes(opts.dir_match_maxdepth);

        // List the directory once and partition its entries.
        let mut entries: Vec<(String, bool)> = Vec::new();
        let read = fs::read_dir(&frame.src).map_err(|e| Error::Io {
            message: format!("reading directory {}: {}", frame.src.display(), e),
        })?;
        for entry in read {
            let entry = entry.map_err(|e| Error::Io {
                message: format!("reading directory {}: {}", frame.src.display(), e),
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push((name, is_dir));
        }
        entries.sort();

        let mut subdirs: Vec<String> = Vec::new();
        let mut files: Vec<String> = Vec::new();
        let mut subdir_pass: Option<Vec<bool>> = if opts.dir_filter.is_empty() {
            None
        } else {
            Some(Vec::new())
        };
        for (name, is_dir) in entries {
            if is_dir {
                if let Some(flags) = &mut subdir_pass {
                    flags.push(opts.dir_filter.accepts(&name));
                }
                subdirs.push(name);
            } else if passes && opts.file_filter.accepts(&name) {
                files.push(name);
            }
        }

        // Depth never exceeds maxdepth here since descent stops at the bound.
        let in_window = opts.in_depth_window(frame.depth);

        if in_window && passes {
            if let (Some(transfer), Some(dst)) =
                (self.walker.transfer.as_ref(), frame.dst.as_ref())
            {
                let dry_run = transfer.options().dry_run;
                if !dry_run
                    && (!opts.mkdir_on_first_file || !files.is_empty())
                    && !dst.is_dir()
                {
                    trace!("creating destination directory {}", dst.display());
                    fs::create_dir_all(dst).map_err(|e| Error::Io {
                        message: format!(
                            "creating destination directory {}: {}",
                            dst.display(),
                            e
                        ),
                    })?;
                }
                for name in &files {
                    let src_file = frame.src.join(name);
                    let dst_file = dst.join(opts.file_renames.apply(name));
                    transfer.execute(&src_file, &dst_file)?;
                }
            }
        }

        // Under a matched directory in tracked mode all subdirectories stay
        // visible; otherwise the directory filter trims the listing.
        let subdirs_for_yield = if passes && self.tracked {
            subdirs.clone()
        } else if let Some(flags) = &subdir_pass {
            subdirs
                .iter()
                .zip(flags)
                .filter(|(_, pass)| **pass)
                .map(|(name, _)| name.clone())
                .collect()
        } else {
            subdirs.clone()
        };

        // Descend while below maxdepth; children are pushed in reverse so
        // siblings pop in listing order.
        if opts.maxdepth.map_or(true, |max| frame.depth < max) {
            for (i, name) in subdirs.iter().enumerate().rev() {
                let name_passes = subdir_pass.as_ref().map_or(true, |flags| flags[i]);
                let child_dst = match &frame.dst {
                    None => None,
                    Some(dst) if opts.collapse => Some(dst.clone()),
                    Some(dst) => Some(dst.join(opts.dir_renames.apply(name))),
                };
                self.stack.push(Frame {
                    src: frame.src.join(name),
                    dst: child_dst,
                    depth: frame.depth + 1,
                    state: state.child(name_passes),
                });
            }
        }

        if in_window {
            Ok(Some(WalkEntry {
                dir: frame.src,
                subdirs: subdirs_for_yield,
                files,
            }))
        } else {
            Ok(None)
        }
    }
}

impl Iterator for WalkIter<'_> {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(frame) = self.stack.pop() {
            match self.visit(frame) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
