//! Job specification
//!
//! Everything that varies between two submission commands in one batch is in
//! the [`JobSpec`]; the scheduler and jobscript are fixed for the batch.

/// Completion-mail request attached to a job
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MailSpec {
    /// Notify the submitting user through the scheduler default address
    Notify,
    /// Notify an explicit address
    NotifyUser(String),
}

/// One job's submission parameters
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobSpec {
    /// Job name, unique per bundle index within a batch
    pub name: String,
    /// Wall-time hours
    pub time_hr: Option<u64>,
    /// Wall-time minutes
    pub time_min: Option<u64>,
    /// Wall-time seconds
    pub time_sec: Option<u64>,
    /// Memory request in gigabytes
    pub memory_gb: Option<u64>,
    /// Node request passed through to the scheduler
    pub node: Option<String>,
    /// Mail-on-completion request; attached to the last job of a batch only
    pub email: Option<MailSpec>,
    /// Environment variables exported to the job, in insertion order
    pub env_vars: Vec<(String, String)>,
}

impl JobSpec {
    /// Create a job spec with the given name and no resource requests
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Total requested wall-time rendered `H:MM:SS`, normalized so that
    /// overflowing minutes or seconds carry upward
    ///
    /// Returns `None` when no wall-time component was requested.
    pub fn walltime_hms(&self) -> Option<String> {
        let total_sec = self.time_hr.unwrap_or(0) * 3600
            + self.time_min.unwrap_or(0) * 60
            + self.time_sec.unwrap_or(0);
        if total_sec == 0 {
            return None;
        }
        let (min, sec) = (total_sec / 60, total_sec % 60);
        let (hr, min) = (min / 60, min % 60);
        Some(format!("{}:{:02}:{:02}", hr, min, sec))
    }

    /// Environment variables rendered as the comma-joined `name="value"`
    /// list both schedulers accept
    pub fn env_var_list(&self) -> Option<String> {
        if self.env_vars.is_empty() {
            return None;
        }
        Some(
            self.env_vars
                .iter()
                .map(|(name, value)| format!("{}=\"{}\"", name, value))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Job name for one index in a batch: `{abbrev}{index}`, the index
/// zero-padded to `max(3, digits(total))`
pub fn job_name(abbrev: &str, index: usize, total: usize) -> String {
    let width = std::cmp::max(3, total.to_string().len());
    format!("{}{:0>width$}", abbrev, index, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(2), None, None, Some("2:00:00"))]
    #[case(Some(1), Some(90), None, Some("2:30:00"))]
    #[case(None, Some(5), Some(30), Some("0:05:30"))]
    #[case(None, None, Some(3725), Some("1:02:05"))]
    #[case(None, None, None, None)]
    #[case(Some(0), Some(0), Some(0), None)]
    fn test_walltime_hms(
        #[case] hr: Option<u64>,
        #[case] min: Option<u64>,
        #[case] sec: Option<u64>,
        #[case] expected: Option<&str>,
    ) {
        let job = JobSpec {
            time_hr: hr,
            time_min: min,
            time_sec: sec,
            ..JobSpec::new("j")
        };
        assert_eq!(job.walltime_hms().as_deref(), expected);
    }

    #[test]
    fn test_env_var_list() {
        let mut job = JobSpec::new("j");
        assert!(job.env_var_list().is_none());

        job.env_vars = vec![
            ("p1".to_string(), "/jobscripts/head_pbs.sh".to_string()),
            ("p2".to_string(), "Copy".to_string()),
        ];
        assert_eq!(
            job.env_var_list().unwrap(),
            "p1=\"/jobscripts/head_pbs.sh\",p2=\"Copy\""
        );
    }

    #[rstest]
    #[case("Copy", 1, 10, "Copy001")]
    #[case("Copy", 10, 10, "Copy010")]
    #[case("Copy", 7, 1000, "Copy0007")]
    fn test_job_name(
        #[case] abbrev: &str,
        #[case] index: usize,
        #[case] total: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(job_name(abbrev, index, total), expected);
    }
}
