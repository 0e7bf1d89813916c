//! Supported cluster schedulers

use treeferry_types::{Error, Result};

/// A cluster scheduler backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduler {
    /// PBS/Torque (`qsub`)
    Pbs,
    /// Slurm (`sbatch`)
    Slurm,
}

impl Scheduler {
    /// Parse a scheduler name as given on the command line
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pbs" => Ok(Self::Pbs),
            "slurm" => Ok(Self::Slurm),
            other => Err(Error::config(format!(
                "unrecognized scheduler '{}'; expected 'pbs' or 'slurm'",
                other
            ))),
        }
    }

    /// Canonical lowercase name, used for default jobscript lookup
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pbs => "pbs",
            Self::Slurm => "slurm",
        }
    }

    /// The submission program invoked for this scheduler
    pub fn program(&self) -> &'static str {
        match self {
            Self::Pbs => "qsub",
            Self::Slurm => "sbatch",
        }
    }

    /// Line prefix marking a conditional-option line in a jobscript
    pub fn condopt_prefix(&self) -> &'static str {
        match self {
            Self::Pbs => "#CONDOPT_PBS",
            Self::Slurm => "#CONDOPT_SBATCH",
        }
    }
}

impl std::fmt::Display for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pbs", Scheduler::Pbs)]
    #[case("PBS", Scheduler::Pbs)]
    #[case("slurm", Scheduler::Slurm)]
    #[case("Slurm", Scheduler::Slurm)]
    fn test_from_name(#[case] name: &str, #[case] expected: Scheduler) {
        assert_eq!(Scheduler::from_name(name).unwrap(), expected);
    }

    #[test]
    fn test_unknown_scheduler_is_config_error() {
        assert!(Scheduler::from_name("sge").is_err());
    }

    #[test]
    fn test_programs_and_prefixes() {
        assert_eq!(Scheduler::Pbs.program(), "qsub");
        assert_eq!(Scheduler::Slurm.program(), "sbatch");
        assert_eq!(Scheduler::Pbs.condopt_prefix(), "#CONDOPT_PBS");
        assert_eq!(Scheduler::Slurm.condopt_prefix(), "#CONDOPT_SBATCH");
    }
}
