//! Fire-and-forget submission
//!
//! Each command is handed to the shell and waited on only long enough for
//! the scheduler to accept or reject it. A rejected job is reported and the
//! remaining jobs in the batch are still submitted.

use std::path::PathBuf;
use std::process::Command;
use tracing::{error, info};
use treeferry_types::{Error, Result};

/// Issues submission commands for one batch
#[derive(Debug, Clone, Default)]
pub struct Submitter {
    logdir: Option<PathBuf>,
    dry_run: bool,
}

impl Submitter {
    /// Create a submitter; `logdir`, when set, becomes the working directory
    /// of every submission subprocess
    pub fn new(logdir: Option<PathBuf>, dry_run: bool) -> Self {
        Self { logdir, dry_run }
    }

    /// Submit one job command
    ///
    /// The command is always echoed. In dry-run mode nothing is executed.
    pub fn submit(&self, job_name: &str, command: &str) -> Result<()> {
        info!("{}", command);
        if self.dry_run {
            return Ok(());
        }

        let mut shell = Command::new("sh");
        shell.arg("-c").arg(command);
        if let Some(logdir) = &self.logdir {
            shell.current_dir(logdir);
        }

        let status = shell
            .status()
            .map_err(|e| Error::submission(job_name, e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::submission(
                job_name,
                format!("submission command exited with {}", status),
            ))
        }
    }

    /// Submit every job in a batch, reporting failures without stopping
    ///
    /// Returns the number of failed submissions.
    pub fn submit_all<I, S1, S2>(&self, jobs: I) -> usize
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let mut failures = 0;
        for (job_name, command) in jobs {
            if let Err(e) = self.submit(job_name.as_ref(), command.as_ref()) {
                error!("{}", e);
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_executes_nothing() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let cmd = format!("touch {}", marker.display());
        Submitter::new(None, true).submit("j001", &cmd).unwrap();
        assert!(!marker.exists());
    }

    #[test]
    fn test_subprocess_runs_in_logdir() {
        let dir = TempDir::new().unwrap();
        let submitter = Submitter::new(Some(dir.path().to_path_buf()), false);
        submitter.submit("j001", "touch ran_here").unwrap();
        assert!(dir.path().join("ran_here").exists());
    }

    #[test]
    fn test_rejected_job_is_nonfatal_submission_error() {
        let err = Submitter::new(None, false)
            .submit("j001", "exit 3")
            .unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("j001"));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        let after = dir.path().join("after");
        let submitter = Submitter::new(None, false);
        let failures = submitter.submit_all(vec![
            ("j001", "exit 1".to_string()),
            ("j002", format!("touch {}", after.display())),
        ]);
        assert_eq!(failures, 1);
        assert!(after.exists());
    }
}
