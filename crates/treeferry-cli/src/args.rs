//! Command-line argument surface
//!
//! One flat flag set covering both direct execution and cluster submission.
//! Flags that cannot be combined are declared mutually exclusive here;
//! everything that needs filesystem context to validate happens during task
//! resolution.

use clap::Parser;
use std::path::PathBuf;
use treeferry_filter::{FilterSpec, NameFilter, RenameRules};
use treeferry_transfer::{Transfer, TransferMethod, TransferOptions};
use treeferry_types::{Error, Result, TreeShape};
use treeferry_walk::WalkOptions;

/// Copy, link, or move a single file, a whole file tree, or a list of files,
/// either directly or fanned out as cluster scheduler jobs
#[derive(Parser, Debug)]
#[command(
    name = "treeferry",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy(/link/move) a single file, whole file tree, or list of files",
    long_about = "Treeferry copies, links, or moves files and directory trees with\n\
                  depth-bounded traversal, name filtering, and renaming. Task lists\n\
                  can be split into bundles and submitted to a PBS or Slurm cluster\n\
                  scheduler as independent jobs."
)]
pub struct Cli {
    /// Source file or directory path(s)
    ///
    /// A directory path written with a trailing separator is treated as
    /// sync-style (contents land directly in the destination), otherwise
    /// transplant-style, unless --sync-tree/--transplant-tree says otherwise.
    #[arg(long, value_name = "PATH")]
    pub src: Vec<String>,

    /// Source-list text file(s); rows are 'src' or 'src,dst', optionally
    /// preceded by one 'src_dir,dst_dir' header row
    #[arg(long, value_name = "FILE")]
    pub srclist: Vec<PathBuf>,

    /// Rooted source-list text file(s); one 'src_rootdir,dst_rootdir' header
    /// row, then source paths whose structure below the root is replicated
    /// under the destination root
    #[arg(long = "srclist-rooted", value_name = "FILE")]
    pub srclist_rooted: Vec<PathBuf>,

    /// Destination path for --src sources
    #[arg(long, value_name = "PATH", conflicts_with = "dstdir_global")]
    pub dst: Option<String>,

    /// Destination directory overriding every per-row destination
    #[arg(long = "dstdir-global", value_name = "DIR")]
    pub dstdir_global: Option<String>,

    /// Transfer method: copy, move, hardlink, symlink, or an external
    /// command template with {src}/{dst} placeholders
    #[arg(long = "copy-method", value_name = "METHOD", default_value = "copy")]
    pub copy_method: String,

    /// Overwrite existing destination files
    #[arg(long)]
    pub overwrite: bool,

    /// Minimum traversal depth at which files are transferred
    #[arg(long, value_name = "DEPTH", default_value_t = 0)]
    pub mindepth: u32,

    /// Maximum traversal depth
    #[arg(long, value_name = "DEPTH")]
    pub maxdepth: Option<u32>,

    /// Depth bound beyond which directory-name matching no longer restricts
    /// which files are transferred
    #[arg(long = "dmatch-maxdepth", value_name = "DEPTH")]
    pub dmatch_maxdepth: Option<u32>,

    /// File name include pattern(s), glob syntax
    #[arg(long, value_name = "PATTERN")]
    pub fmatch: Vec<String>,

    /// File name include pattern(s), regex syntax
    #[arg(long = "fmatch-re", value_name = "REGEX")]
    pub fmatch_re: Vec<String>,

    /// File name exclude pattern(s), glob syntax
    #[arg(long, value_name = "PATTERN")]
    pub fexcl: Vec<String>,

    /// File name exclude pattern(s), regex syntax
    #[arg(long = "fexcl-re", value_name = "REGEX")]
    pub fexcl_re: Vec<String>,

    /// Directory name include pattern(s), glob syntax
    #[arg(long, value_name = "PATTERN")]
    pub dmatch: Vec<String>,

    /// Directory name include pattern(s), regex syntax
    #[arg(long = "dmatch-re", value_name = "REGEX")]
    pub dmatch_re: Vec<String>,

    /// Directory name exclude pattern(s), glob syntax
    #[arg(long, value_name = "PATTERN")]
    pub dexcl: Vec<String>,

    /// Directory name exclude pattern(s), regex syntax
    #[arg(long = "dexcl-re", value_name = "REGEX")]
    pub dexcl_re: Vec<String>,

    /// File rename rule applied to transferred files, repeatable
    #[arg(long = "fsub-re", value_names = ["PATTERN", "REPL"], num_args = 2)]
    pub fsub_re: Vec<String>,

    /// Directory rename rule applied to mirrored directories, repeatable
    #[arg(long = "dsub-re", value_names = ["PATTERN", "REPL"], num_args = 2)]
    pub dsub_re: Vec<String>,

    /// Treat every source directory as sync-style
    #[arg(long = "sync-tree", conflicts_with = "transplant_tree")]
    pub sync_tree: bool,

    /// Treat every source directory as transplant-style
    #[arg(long = "transplant-tree")]
    pub transplant_tree: bool,

    /// Flatten files from every depth into the single destination directory
    #[arg(long = "collapse-tree")]
    pub collapse_tree: bool,

    /// Column delimiter for source-list and bundle files
    #[arg(long = "srclist-delim", value_name = "DELIM", default_value = ",")]
    pub srclist_delim: String,

    /// Disable '*' glob expansion of source-list rows
    #[arg(long = "srclist-noglob")]
    pub srclist_noglob: bool,

    /// Suppress per-transfer output
    #[arg(long)]
    pub silent: bool,

    /// Additionally log the exact primitive or command behind each transfer
    #[arg(long)]
    pub debug: bool,

    /// Traverse and report without mutating the filesystem
    #[arg(long)]
    pub dryrun: bool,

    /// Submit tasks to a cluster scheduler: 'pbs' or 'slurm'
    #[arg(long, value_name = "NAME")]
    pub scheduler: Option<String>,

    /// Jobscript template handed to the scheduler; defaults to
    /// jobscripts/head_{scheduler}.sh next to the executable
    #[arg(long, value_name = "FILE")]
    pub jobscript: Option<PathBuf>,

    /// Bundle this many tasks into each scheduler job
    #[arg(long = "tasks-per-job", value_name = "N")]
    pub tasks_per_job: Option<usize>,

    /// Directory for task bundle files
    #[arg(long, value_name = "DIR")]
    pub bundledir: Option<PathBuf>,

    /// Job name prefix
    #[arg(long = "job-abbrev", value_name = "ABBREV", default_value = "Copy")]
    pub job_abbrev: String,

    /// Job wall-time request in hours
    #[arg(long = "job-walltime", value_name = "HOURS", default_value_t = 1)]
    pub job_walltime: u64,

    /// Job memory request in gigabytes
    #[arg(long = "job-memory", value_name = "GB", default_value_t = 5)]
    pub job_memory: u64,

    /// Directory for scheduler stdout/stderr logs; also becomes the working
    /// directory of submission subprocesses
    #[arg(long, value_name = "DIR")]
    pub logdir: Option<PathBuf>,

    /// Send email upon end or abort of the last submitted job; an address
    /// may be given, otherwise the scheduler default is used
    #[arg(long, value_name = "ADDRESS", num_args = 0..=1, default_missing_value = "")]
    pub email: Option<String>,
}

impl Cli {
    /// Cross-flag checks that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.src.is_empty() && self.srclist.is_empty() && self.srclist_rooted.is_empty() {
            return Err(Error::config(
                "at least one of --src, --srclist, --srclist-rooted is required",
            ));
        }
        if !self.src.is_empty() && self.dst.is_none() && self.dstdir_global.is_none() {
            return Err(Error::config(
                "--dst or --dstdir-global is required when --src is provided",
            ));
        }
        if let Some(maxdepth) = self.maxdepth {
            if self.mindepth > maxdepth {
                return Err(Error::config(format!(
                    "--mindepth ({}) cannot exceed --maxdepth ({})",
                    self.mindepth, maxdepth
                )));
            }
        }
        if self.tasks_per_job == Some(0) {
            return Err(Error::config("--tasks-per-job must be >= 1"));
        }
        if self.srclist_delim.is_empty() {
            return Err(Error::config("--srclist-delim cannot be empty"));
        }
        Ok(())
    }

    /// Destination shared by every task, when one was given
    pub fn global_dst(&self) -> Option<&str> {
        self.dst.as_deref().or(self.dstdir_global.as_deref())
    }

    /// Tree shape explicitly requested on the command line, if any
    pub fn explicit_shape(&self) -> Option<TreeShape> {
        if self.sync_tree {
            Some(TreeShape::Sync)
        } else if self.transplant_tree {
            Some(TreeShape::Transplant)
        } else {
            None
        }
    }

    /// The configured transfer, method and runtime options combined
    pub fn transfer(&self) -> Result<Transfer> {
        let method = TransferMethod::from_name(&self.copy_method)
            .unwrap_or_else(|| TransferMethod::command(self.copy_method.clone()));
        Ok(Transfer::with_options(method, self.transfer_options()))
    }

    /// Runtime transfer options
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            overwrite: self.overwrite,
            dry_run: self.dryrun,
            verbose: !self.silent,
            debug: self.debug,
        }
    }

    fn compile_filter(
        globs: &[String],
        regexes: &[String],
        exclude_globs: &[String],
        exclude_regexes: &[String],
    ) -> Result<NameFilter> {
        FilterSpec {
            include_globs: globs.to_vec(),
            include_regexes: regexes.to_vec(),
            exclude_globs: exclude_globs.to_vec(),
            exclude_regexes: exclude_regexes.to_vec(),
            partial: false,
        }
        .compile()
    }

    fn rename_pairs(flat: &[String]) -> Vec<(String, String)> {
        flat.chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }

    /// Traversal options compiled from the filter and depth flags
    pub fn walk_options(&self) -> Result<WalkOptions> {
        let mut options = WalkOptions::new()
            .mindepth(self.mindepth)
            .file_filter(Self::compile_filter(
                &self.fmatch,
                &self.fmatch_re,
                &self.fexcl,
                &self.fexcl_re,
            )?)
            .dir_filter(Self::compile_filter(
                &self.dmatch,
                &self.dmatch_re,
                &self.dexcl,
                &self.dexcl_re,
            )?)
            .file_renames(RenameRules::compile(&Self::rename_pairs(&self.fsub_re))?)
            .dir_renames(RenameRules::compile(&Self::rename_pairs(&self.dsub_re))?)
            .collapse(self.collapse_tree);
        if let Some(maxdepth) = self.maxdepth {
            options = options.maxdepth(maxdepth);
        }
        if let Some(depth) = self.dmatch_maxdepth {
            options = options.dir_match_maxdepth(depth);
        }
        Ok(options)
    }
}
