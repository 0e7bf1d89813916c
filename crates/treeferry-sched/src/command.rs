//! Submission command construction
//!
//! One command string per job: program, resource flags, conditional options
//! from the jobscript template, then the jobscript path as the final
//! argument.

use crate::condopt::{condopt_flags, CondoptVars};
use crate::job::{JobSpec, MailSpec};
use crate::scheduler::Scheduler;
use std::path::Path;
use treeferry_types::Result;

fn pbs_flags(job: &JobSpec, parts: &mut Vec<String>) {
    if !job.name.is_empty() {
        parts.push(format!("-N {}", job.name));
    }
    let mut resources = Vec::new();
    if let Some(node) = &job.node {
        resources.push(format!("nodes={}", node));
    }
    if let Some(hms) = job.walltime_hms() {
        resources.push(format!("walltime={}", hms));
    }
    if let Some(gb) = job.memory_gb {
        resources.push(format!("mem={}gb", gb));
    }
    if !resources.is_empty() {
        parts.push(format!("-l {}", resources.join(",")));
    }
    if let Some(env) = job.env_var_list() {
        parts.push(format!("-v {}", env));
    }
    match &job.email {
        Some(MailSpec::Notify) => parts.push("-m ae".to_string()),
        Some(MailSpec::NotifyUser(user)) => {
            parts.push("-m ae".to_string());
            parts.push(format!("-M {}", user));
        }
        None => {}
    }
}

fn slurm_flags(job: &JobSpec, parts: &mut Vec<String>) {
    if !job.name.is_empty() {
        parts.push(format!("--job-name {}", job.name));
    }
    if let Some(node) = &job.node {
        parts.push(format!("--nodelist {}", node));
    }
    if let Some(hms) = job.walltime_hms() {
        parts.push(format!("--time {}", hms));
    }
    if let Some(gb) = job.memory_gb {
        parts.push(format!("--mem {}G", gb));
    }
    if let Some(env) = job.env_var_list() {
        parts.push(format!("--export {}", env));
    }
    match &job.email {
        Some(MailSpec::Notify) => parts.push("--mail-type FAIL,END".to_string()),
        Some(MailSpec::NotifyUser(user)) => {
            parts.push("--mail-type FAIL,END".to_string());
            parts.push(format!("--mail-user {}", user));
        }
        None => {}
    }
}

/// Build the full shell command submitting `job` through `scheduler`
///
/// Conditional-option lines in `jobscript` are evaluated against `vars`; the
/// quoted jobscript path is always the final argument.
pub fn build_command(
    scheduler: Scheduler,
    job: &JobSpec,
    jobscript: &Path,
    vars: &CondoptVars,
) -> Result<String> {
    let mut parts = vec![scheduler.program().to_string()];
    match scheduler {
        Scheduler::Pbs => pbs_flags(job, &mut parts),
        Scheduler::Slurm => slurm_flags(job, &mut parts),
    }
    parts.extend(condopt_flags(jobscript, scheduler, vars)?);
    parts.push(format!("\"{}\"", jobscript.display()));
    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn jobscript_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn job() -> JobSpec {
        JobSpec {
            time_hr: Some(1),
            time_min: Some(30),
            memory_gb: Some(4),
            env_vars: vec![("p1".to_string(), "Copy".to_string())],
            ..JobSpec::new("Copy001")
        }
    }

    #[test]
    fn test_pbs_command() {
        let f = jobscript_with("#!/bin/bash\n");
        let cmd = build_command(Scheduler::Pbs, &job(), f.path(), &CondoptVars::new()).unwrap();
        assert!(cmd.starts_with("qsub -N Copy001 -l walltime=1:30:00,mem=4gb -v p1=\"Copy\""));
        assert!(cmd.ends_with(&format!("\"{}\"", f.path().display())));
    }

    #[test]
    fn test_slurm_command() {
        let f = jobscript_with("#!/bin/bash\n");
        let cmd = build_command(Scheduler::Slurm, &job(), f.path(), &CondoptVars::new()).unwrap();
        assert!(
            cmd.starts_with("sbatch --job-name Copy001 --time 1:30:00 --mem 4G --export p1=\"Copy\""),
            "{}",
            cmd
        );
    }

    #[test]
    fn test_mail_flags_on_last_job_only_by_construction() {
        let f = jobscript_with("#!/bin/bash\n");
        let mut j = job();
        j.email = Some(MailSpec::NotifyUser("user@example.edu".to_string()));
        let cmd = build_command(Scheduler::Slurm, &j, f.path(), &CondoptVars::new()).unwrap();
        assert!(cmd.contains("--mail-type FAIL,END --mail-user user@example.edu"));

        let plain = build_command(Scheduler::Slurm, &job(), f.path(), &CondoptVars::new()).unwrap();
        assert!(!plain.contains("--mail-type"));
    }

    #[test]
    fn test_condopts_inserted_before_jobscript_path() {
        let f = jobscript_with("#CONDOPT_PBS -o %logdir IF %logdir\n");
        let mut vars = CondoptVars::new();
        vars.set("logdir", "/scratch/logs");
        let cmd = build_command(Scheduler::Pbs, &job(), f.path(), &vars).unwrap();
        let tail = format!("-o /scratch/logs \"{}\"", f.path().display());
        assert!(cmd.ends_with(&tail), "{}", cmd);
    }

    #[test]
    fn test_minimal_job_has_only_name_and_script() {
        let f = jobscript_with("#!/bin/bash\n");
        let cmd = build_command(
            Scheduler::Pbs,
            &JobSpec::new("j001"),
            f.path(),
            &CondoptVars::new(),
        )
        .unwrap();
        assert_eq!(cmd, format!("qsub -N j001 \"{}\"", f.path().display()));
    }
}
