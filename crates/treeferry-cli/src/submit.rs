//! Cluster submission path
//!
//! Tasks are optionally bundled, then one scheduler job is submitted per
//! task or bundle. Each job re-invokes this executable with the scheduler
//! flags stripped and the task (or bundle file) substituted for the source
//! arguments; the rendered child command reaches the jobscript through
//! exported environment variables.

use crate::args::Cli;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use treeferry_bundle::{plan_bundles, write_bundles};
use treeferry_sched::{build_command, job_name, CondoptVars, JobSpec, MailSpec, Scheduler, Submitter};
use treeferry_types::{Error, Result, Task};

/// One scheduler job's workload
enum JobUnit {
    /// A single task passed as --src/--dst
    Task(Task),
    /// A bundle file passed as --srclist
    Bundle(PathBuf),
}

/// Resolve the jobscript: explicit flag, else `jobscripts/head_{name}.sh`
/// next to the executable, else the same path under the working directory
fn resolve_jobscript(cli: &Cli, scheduler: Scheduler) -> Result<PathBuf> {
    if let Some(jobscript) = &cli.jobscript {
        return Ok(jobscript.clone());
    }
    let file_name = format!("head_{}.sh", scheduler.name());
    let mut candidates = Vec::new();
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("jobscripts").join(&file_name));
        }
    }
    candidates.push(PathBuf::from("jobscripts").join(&file_name));
    for candidate in &candidates {
        if candidate.is_file() {
            info!("argument --jobscript set automatically to: {}", candidate.display());
            return Ok(candidate.clone());
        }
    }
    Err(Error::config(format!(
        "default jobscript ({}) does not exist, please specify one with --jobscript",
        candidates
            .last()
            .map(|p| p.display().to_string())
            .unwrap_or(file_name)
    )))
}

/// Default bundle directory: `~/scratch/task_bundles`
fn default_bundledir() -> PathBuf {
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join("scratch").join("task_bundles")
}

fn shell_quote(arg: &str) -> String {
    if arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '*' | '$' | '\\' | '{' | '}'))
    {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// Render the child invocation for one job unit
///
/// Scheduler flags are stripped; destinations were standardized to
/// sync-style during resolution, so the child always runs with --sync-tree.
fn child_command(cli: &Cli, program: &str, unit: &JobUnit) -> String {
    let mut argv: Vec<String> = vec![program.to_string()];

    match unit {
        JobUnit::Task(task) => {
            argv.push("--src".to_string());
            argv.push(shell_quote(&task.source.display().to_string()));
            argv.push("--dst".to_string());
            argv.push(shell_quote(&task.dest.display().to_string()));
        }
        JobUnit::Bundle(bundle) => {
            argv.push("--srclist".to_string());
            argv.push(shell_quote(&bundle.display().to_string()));
        }
    }
    argv.push("--sync-tree".to_string());

    if cli.copy_method != "copy" {
        argv.push("--copy-method".to_string());
        argv.push(shell_quote(&cli.copy_method));
    }
    if cli.overwrite {
        argv.push("--overwrite".to_string());
    }
    if cli.mindepth != 0 {
        argv.push("--mindepth".to_string());
        argv.push(cli.mindepth.to_string());
    }
    if let Some(maxdepth) = cli.maxdepth {
        argv.push("--maxdepth".to_string());
        argv.push(maxdepth.to_string());
    }
    if let Some(depth) = cli.dmatch_maxdepth {
        argv.push("--dmatch-maxdepth".to_string());
        argv.push(depth.to_string());
    }
    for (flag, values) in [
        ("--fmatch", &cli.fmatch),
        ("--fmatch-re", &cli.fmatch_re),
        ("--fexcl", &cli.fexcl),
        ("--fexcl-re", &cli.fexcl_re),
        ("--dmatch", &cli.dmatch),
        ("--dmatch-re", &cli.dmatch_re),
        ("--dexcl", &cli.dexcl),
        ("--dexcl-re", &cli.dexcl_re),
    ] {
        for value in values.iter() {
            argv.push(flag.to_string());
            argv.push(shell_quote(value));
        }
    }
    for (flag, rules) in [("--fsub-re", &cli.fsub_re), ("--dsub-re", &cli.dsub_re)] {
        for pair in rules.chunks_exact(2) {
            argv.push(flag.to_string());
            argv.push(shell_quote(&pair[0]));
            argv.push(shell_quote(&pair[1]));
        }
    }
    if cli.collapse_tree {
        argv.push("--collapse-tree".to_string());
    }
    if cli.srclist_delim != "," {
        argv.push("--srclist-delim".to_string());
        argv.push(shell_quote(&cli.srclist_delim));
    }
    if cli.srclist_noglob {
        argv.push("--srclist-noglob".to_string());
    }
    if cli.silent {
        argv.push("--silent".to_string());
    }
    if cli.debug {
        argv.push("--debug".to_string());
    }
    if cli.dryrun {
        argv.push("--dryrun".to_string());
    }

    argv.join(" ")
}

/// Bundle tasks as configured and submit one scheduler job per unit
pub fn submit_tasks(cli: &Cli, tasks: Vec<Task>) -> Result<()> {
    let scheduler = Scheduler::from_name(
        cli.scheduler
            .as_deref()
            .ok_or_else(|| Error::config("--scheduler is required for submission"))?,
    )?;
    let jobscript = resolve_jobscript(cli, scheduler)?;

    let logdir = cli.logdir.clone();
    if let Some(dir) = &logdir {
        if !cli.dryrun {
            fs::create_dir_all(dir)?;
        }
    }

    let units: Vec<JobUnit> = match cli.tasks_per_job {
        Some(per_job) => {
            let bundledir = cli.bundledir.clone().unwrap_or_else(default_bundledir);
            let prefix = format!("{}_srclist", cli.job_abbrev);
            let bundles = if cli.dryrun {
                plan_bundles(&tasks, per_job, &bundledir, &prefix)?
            } else {
                write_bundles(&tasks, per_job, &bundledir, &prefix, &cli.srclist_delim)?
            };
            bundles.into_iter().map(JobUnit::Bundle).collect()
        }
        None => tasks.into_iter().map(JobUnit::Task).collect(),
    };

    let program = env::current_exe()
        .map(|exe| exe.display().to_string())
        .unwrap_or_else(|_| "treeferry".to_string());

    let mut vars = CondoptVars::new();
    vars.set(
        "logdir",
        logdir
            .as_deref()
            .map(|dir: &Path| dir.display().to_string())
            .unwrap_or_default(),
    );
    vars.set("email", cli.email.clone().unwrap_or_default());
    vars.set("jobscript", jobscript.display().to_string());
    vars.set("abbrev", cli.job_abbrev.clone());

    let total = units.len();
    let submitter = Submitter::new(logdir, cli.dryrun);
    let mut failures = 0;
    for (index, unit) in units.iter().enumerate() {
        let name = job_name(&cli.job_abbrev, index + 1, total);
        let task_cmd = child_command(cli, &program, unit);

        let mut job = JobSpec::new(name.clone());
        job.time_hr = Some(cli.job_walltime);
        job.memory_gb = Some(cli.job_memory);
        job.env_vars = vec![
            ("p1".to_string(), jobscript.display().to_string()),
            ("p2".to_string(), cli.job_abbrev.clone()),
            ("p3".to_string(), task_cmd),
        ];
        if index + 1 == total {
            job.email = match cli.email.as_deref() {
                Some("") => Some(MailSpec::Notify),
                Some(address) => Some(MailSpec::NotifyUser(address.to_string())),
                None => None,
            };
        }

        let command = build_command(scheduler, &job, &jobscript, &vars)?;
        if let Err(e) = submitter.submit(&name, &command) {
            warn!("{}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        warn!("{} of {} job submission(s) failed", failures, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("treeferry").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_child_command_for_single_task() {
        let cli = parse(&[
            "--src", "/data/set1", "--dst", "/out",
            "--scheduler", "pbs", "--overwrite", "--maxdepth", "3",
        ]);
        let unit = JobUnit::Task(Task::new("/data/set1", "/out/set1"));
        let cmd = child_command(&cli, "/usr/bin/treeferry", &unit);
        assert!(cmd.starts_with("/usr/bin/treeferry --src /data/set1 --dst /out/set1 --sync-tree"));
        assert!(cmd.contains("--overwrite"));
        assert!(cmd.contains("--maxdepth 3"));
        assert!(!cmd.contains("--scheduler"));
    }

    #[test]
    fn test_child_command_for_bundle() {
        let cli = parse(&[
            "--src", "/data/set1", "--dst", "/out",
            "--scheduler", "slurm", "--tasks-per-job", "5",
            "--fmatch", "*.tif", "--silent",
        ]);
        let unit = JobUnit::Bundle(PathBuf::from("/scratch/Copy_srclist_20260825_001.txt"));
        let cmd = child_command(&cli, "treeferry", &unit);
        assert!(cmd.contains("--srclist /scratch/Copy_srclist_20260825_001.txt"));
        assert!(cmd.contains("--fmatch '*.tif'"));
        assert!(cmd.contains("--silent"));
        assert!(!cmd.contains("--tasks-per-job"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "plain");
        assert_eq!(shell_quote("has space"), "'has space'");
        assert_eq!(shell_quote("*.tif"), "'*.tif'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_dryrun_submission_writes_no_bundle_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let jobscript = dir.path().join("head.sh");
        fs::write(&jobscript, "#!/bin/bash\n").unwrap();
        let bundledir = dir.path().join("bundles");
        let cli = parse(&[
            "--src", "/data/set1", "--dst", "/out",
            "--scheduler", "pbs", "--tasks-per-job", "1", "--dryrun",
            "--jobscript", jobscript.to_str().unwrap(),
            "--bundledir", bundledir.to_str().unwrap(),
        ]);
        submit_tasks(&cli, vec![Task::new("/data/set1", "/out/set1")]).unwrap();
        assert!(!bundledir.exists());
    }

    #[test]
    fn test_explicit_jobscript_is_used_as_given() {
        let cli = parse(&[
            "--src", "/a", "--dst", "/b",
            "--scheduler", "pbs", "--jobscript", "/custom/head.sh",
        ]);
        let path = resolve_jobscript(&cli, Scheduler::Pbs).unwrap();
        assert_eq!(path, PathBuf::from("/custom/head.sh"));
    }
}
