//! Cluster-scheduler job submission
//!
//! Builds and issues one submission command per task or bundle. The command
//! is a deterministic function of a [`JobSpec`], the target scheduler, and
//! the jobscript template; conditional-option lines in the jobscript add
//! scheduler flags through a small substitution-and-comparison language with
//! no general code evaluation. Submission itself is fire and forget: a
//! rejected job is reported and the rest of the batch proceeds.

pub mod command;
pub mod condopt;
pub mod job;
pub mod scheduler;
pub mod submit;

pub use command::build_command;
pub use condopt::{condopt_flags, CondoptVars};
pub use job::{job_name, JobSpec, MailSpec};
pub use scheduler::Scheduler;
pub use submit::Submitter;
