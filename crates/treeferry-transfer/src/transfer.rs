//! Transfer execution
//!
//! [`Transfer::execute`] performs one source-to-destination transfer and
//! reports its outcome. Overwrite, dry-run, verbose, and debug behavior all
//! live here so the walker and the direct-task driver share one code path.

use crate::method::TransferMethod;
use filetime::FileTime;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};
use treeferry_types::{Error, Result};

/// Runtime options shared by every transfer in a run
///
/// Options are fixed before traversal begins and may be reconfigured between
/// runs via [`Transfer::set_options`], never concurrently.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferOptions {
    /// Replace an existing destination instead of skipping it
    pub overwrite: bool,
    /// Log the would-be action and perform no filesystem mutation
    pub dry_run: bool,
    /// Log one action line per transfer
    pub verbose: bool,
    /// Additionally log the exact primitive or command invocation
    pub debug: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            dry_run: false,
            verbose: true,
            debug: false,
        }
    }
}

/// Outcome of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Destination was created
    Transferred,
    /// Destination existed and was replaced
    Overwritten,
    /// Destination existed with identical content; nothing done
    SkippedIdentical,
    /// Destination existed; nothing done
    SkippedExisting,
    /// Dry-run: action logged, nothing done
    DryRun,
}

impl TransferOutcome {
    /// Whether this outcome mutated the filesystem
    pub fn mutated(&self) -> bool {
        matches!(self, Self::Transferred | Self::Overwritten)
    }
}

/// A transfer primitive bound to its runtime options
#[derive(Debug, Clone)]
pub struct Transfer {
    method: TransferMethod,
    options: TransferOptions,
}

impl Transfer {
    /// Create a transfer with default options
    pub fn new(method: TransferMethod) -> Self {
        Self {
            method,
            options: TransferOptions::default(),
        }
    }

    /// Create a transfer with explicit options
    pub fn with_options(method: TransferMethod, options: TransferOptions) -> Self {
        Self { method, options }
    }

    /// The configured method
    pub fn method(&self) -> &TransferMethod {
        &self.method
    }

    /// The current options
    pub fn options(&self) -> TransferOptions {
        self.options
    }

    /// Reconfigure options between runs
    pub fn set_options(&mut self, options: TransferOptions) {
        self.options = options;
    }

    /// Perform one `src -> dst` transfer
    ///
    /// An existing destination is skipped unless overwrite is set, in which
    /// case it is removed first. Dry-run mode logs the action and returns
    /// without touching the filesystem, so it can never raise a transfer
    /// error. A failing primitive is fatal for this task and surfaced with
    /// both paths attached.
    pub fn execute(&self, src: &Path, dst: &Path) -> Result<TransferOutcome> {
        let dst_exists = fs::symlink_metadata(dst).is_ok();

        let (proceed, note) = if dst_exists {
            if self.options.overwrite {
                (true, "OVERWRITING")
            } else if self.method.is_link_style() && files_identical(src, dst) {
                (false, "SKIPPING; correct link already exists")
            } else {
                (false, "SKIPPING; destination file already exists")
            }
        } else {
            (true, "")
        };

        if self.options.verbose {
            info!(
                "{}{}: {} -> {}{}",
                if self.options.dry_run { "(dryrun) " } else { "" },
                self.method.action_verb(),
                src.display(),
                dst.display(),
                if note.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", note)
                }
            );
        }

        if !proceed {
            return Ok(if note.contains("correct link") {
                TransferOutcome::SkippedIdentical
            } else {
                TransferOutcome::SkippedExisting
            });
        }

        if self.options.debug {
            debug!("{}", self.invocation(src, dst));
        }

        if self.options.dry_run {
            return Ok(TransferOutcome::DryRun);
        }

        if dst_exists {
            fs::remove_file(dst)
                .map_err(|e| Error::transfer(src, dst, format!("removing destination: {}", e)))?;
        }

        self.perform(src, dst)?;

        Ok(if dst_exists {
            TransferOutcome::Overwritten
        } else {
            TransferOutcome::Transferred
        })
    }

    /// Human-readable description of the underlying invocation
    fn invocation(&self, src: &Path, dst: &Path) -> String {
        match &self.method {
            TransferMethod::Copy => format!("fs::copy({}, {})", src.display(), dst.display()),
            TransferMethod::Move => format!("fs::rename({}, {})", src.display(), dst.display()),
            TransferMethod::Hardlink => {
                format!("fs::hard_link({}, {})", src.display(), dst.display())
            }
            TransferMethod::Symlink => format!("symlink({}, {})", src.display(), dst.display()),
            TransferMethod::Command { .. } => self
                .command_argv(src, dst)
                .join(" "),
        }
    }

    /// Resolve the external-command argument vector for one transfer
    fn command_argv(&self, src: &Path, dst: &Path) -> Vec<String> {
        let TransferMethod::Command {
            template,
            dest_first,
        } = &self.method
        else {
            return Vec::new();
        };

        let src_str = src.display().to_string();
        let dst_str = dst.display().to_string();
        let mut argv: Vec<String> = template.split_whitespace().map(String::from).collect();

        let has_placeholders = argv
            .iter()
            .any(|arg| arg.contains("{src}") || arg.contains("{dst}"));
        if has_placeholders {
            for arg in &mut argv {
                *arg = arg.replace("{src}", &src_str).replace("{dst}", &dst_str);
            }
        } else if *dest_first {
            argv.push(dst_str);
            argv.push(src_str);
        } else {
            argv.push(src_str);
            argv.push(dst_str);
        }
        argv
    }

    fn perform(&self, src: &Path, dst: &Path) -> Result<()> {
        match &self.method {
            TransferMethod::Copy => {
                fs::copy(src, dst).map_err(|e| Error::transfer(src, dst, e.to_string()))?;
                copy_timestamps(src, dst)?;
            }
            TransferMethod::Move => {
                if fs::rename(src, dst).is_err() {
                    // Cross-device move: copy then remove the source.
                    fs::copy(src, dst).map_err(|e| Error::transfer(src, dst, e.to_string()))?;
                    copy_timestamps(src, dst)?;
                    fs::remove_file(src)
                        .map_err(|e| Error::transfer(src, dst, e.to_string()))?;
                }
            }
            TransferMethod::Hardlink => {
                fs::hard_link(src, dst).map_err(|e| Error::transfer(src, dst, e.to_string()))?;
            }
            TransferMethod::Symlink => {
                symlink_file(src, dst).map_err(|e| Error::transfer(src, dst, e.to_string()))?;
            }
            TransferMethod::Command { .. } => {
                let argv = self.command_argv(src, dst);
                let (program, args) = argv
                    .split_first()
                    .ok_or_else(|| Error::transfer(src, dst, "empty command template"))?;
                let status = Command::new(program)
                    .args(args)
                    .status()
                    .map_err(|e| Error::transfer(src, dst, format!("{}: {}", program, e)))?;
                if !status.success() {
                    return Err(Error::transfer(
                        src,
                        dst,
                        format!("'{}' exited with {}", argv.join(" "), status),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

fn copy_timestamps(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::transfer(src, dst, e.to_string()))?;
    let mtime = FileTime::from_last_modification_time(&meta);
    let atime = FileTime::from_last_access_time(&meta);
    filetime::set_file_times(dst, atime, mtime)
        .map_err(|e| Error::transfer(src, dst, e.to_string()))
}

/// Byte-wise content comparison, short-circuiting on the first difference
///
/// Unreadable paths compare as not identical rather than erroring; this only
/// feeds the skip-reason log line.
fn files_identical(a: &Path, b: &Path) -> bool {
    let (Ok(fa), Ok(fb)) = (fs::File::open(a), fs::File::open(b)) else {
        return false;
    };
    match (fa.metadata(), fb.metadata()) {
        (Ok(ma), Ok(mb)) if ma.len() != mb.len() => return false,
        (Err(_), _) | (_, Err(_)) => return false,
        _ => {}
    }

    let mut ra = BufReader::new(fa);
    let mut rb = BufReader::new(fb);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let na = match ra.read(&mut buf_a) {
            Ok(n) => n,
            Err(_) => return false,
        };
        let nb = match read_exactly(&mut rb, &mut buf_b[..na]) {
            Ok(n) => n,
            Err(_) => return false,
        };
        if na != nb || buf_a[..na] != buf_b[..nb] {
            return false;
        }
        if na == 0 {
            return true;
        }
    }
}

fn read_exactly<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(content: &str) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, content).unwrap();
        (dir, src, dst)
    }

    #[test]
    fn test_copy_creates_destination() {
        let (_dir, src, dst) = fixture("hello");
        let transfer = Transfer::new(TransferMethod::Copy);
        let outcome = transfer.execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::Transferred);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
        assert!(src.exists());
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let (_dir, src, dst) = fixture("hello");
        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&src, old).unwrap();

        Transfer::new(TransferMethod::Copy).execute(&src, &dst).unwrap();
        let copied = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(copied.unix_seconds(), old.unix_seconds());
    }

    #[test]
    fn test_move_removes_source() {
        let (_dir, src, dst) = fixture("hello");
        let outcome = Transfer::new(TransferMethod::Move).execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::Transferred);
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_hardlink_shares_inode() {
        use std::os::unix::fs::MetadataExt;
        let (_dir, src, dst) = fixture("hello");
        Transfer::new(TransferMethod::Hardlink).execute(&src, &dst).unwrap();
        assert_eq!(
            fs::metadata(&src).unwrap().ino(),
            fs::metadata(&dst).unwrap().ino()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_reads_through() {
        let (_dir, src, dst) = fixture("hello");
        Transfer::new(TransferMethod::Symlink).execute(&src, &dst).unwrap();
        assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
    }

    #[test]
    fn test_existing_destination_skipped_without_overwrite() {
        let (_dir, src, dst) = fixture("new content");
        fs::write(&dst, "old content").unwrap();

        let outcome = Transfer::new(TransferMethod::Copy).execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::SkippedExisting);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old content");
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_correct_link_reported_identical() {
        let (_dir, src, dst) = fixture("hello");
        fs::hard_link(&src, &dst).unwrap();

        let outcome = Transfer::new(TransferMethod::Hardlink).execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::SkippedIdentical);
    }

    #[test]
    fn test_overwrite_replaces_destination() {
        let (_dir, src, dst) = fixture("new content");
        fs::write(&dst, "old content").unwrap();

        let transfer = Transfer::with_options(
            TransferMethod::Copy,
            TransferOptions {
                overwrite: true,
                ..Default::default()
            },
        );
        let outcome = transfer.execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::Overwritten);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new content");
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let (_dir, src, dst) = fixture("hello");
        let transfer = Transfer::with_options(
            TransferMethod::Copy,
            TransferOptions {
                dry_run: true,
                ..Default::default()
            },
        );
        let outcome = transfer.execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::DryRun);
        assert!(!dst.exists());
    }

    #[test]
    fn test_dry_run_overwrite_keeps_destination() {
        let (_dir, src, dst) = fixture("new content");
        fs::write(&dst, "old content").unwrap();

        let transfer = Transfer::with_options(
            TransferMethod::Copy,
            TransferOptions {
                overwrite: true,
                dry_run: true,
                ..Default::default()
            },
        );
        transfer.execute(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old content");
    }

    #[test]
    fn test_missing_source_is_transfer_error() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("missing.txt");
        let dst = dir.path().join("dst.txt");

        let err = Transfer::new(TransferMethod::Copy).execute(&src, &dst).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing.txt"));
        assert!(msg.contains("dst.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_transfer() {
        let (_dir, src, dst) = fixture("hello");
        let transfer = Transfer::new(TransferMethod::command("cp"));
        let outcome = transfer.execute(&src, &dst).unwrap();
        assert_eq!(outcome, TransferOutcome::Transferred);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_placeholders() {
        let (_dir, src, dst) = fixture("hello");
        let transfer = Transfer::new(TransferMethod::command("cp {src} {dst}"));
        transfer.execute(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command_failure_is_surfaced() {
        let (_dir, src, dst) = fixture("hello");
        let transfer = Transfer::new(TransferMethod::Command {
            template: "false".into(),
            dest_first: false,
        });
        assert!(transfer.execute(&src, &dst).is_err());
    }

    #[test]
    fn test_files_identical() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();
        assert!(files_identical(&a, &b));

        fs::write(&b, "same bytez").unwrap();
        assert!(!files_identical(&a, &b));

        fs::write(&b, "longer content here").unwrap();
        assert!(!files_identical(&a, &b));
    }
}
