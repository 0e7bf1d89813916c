//! Jobscript conditional-option lines
//!
//! A jobscript template may carry lines of the form
//!
//! ```text
//! #CONDOPT_PBS <options> [IF <condition> [ELSE <options>]]
//! ```
//!
//! (`#CONDOPT_SBATCH` for Slurm). The chosen options are appended to the
//! submission command. `%name` references resolve against a fixed variable
//! table, longest name first, case-insensitively. A condition is either a
//! single comparison (`== != <= >= < >`, numeric when both sides parse as
//! numbers, lexical otherwise) or one bare value tested for truthiness.
//! Nothing in a condition is executed.

use crate::scheduler::Scheduler;
use std::fs;
use std::path::Path;
use treeferry_types::{Error, Result};

/// Variable table for `%name` substitution, resolved longest name first
#[derive(Debug, Clone, Default)]
pub struct CondoptVars {
    vars: Vec<(String, String)>,
}

impl CondoptVars {
    /// Create an empty variable table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, keeping names sorted longest first so that `%logdir`
    /// can never be shadowed by a shorter `%log`
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        let name = name.into();
        self.vars.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.vars.push((name, value.into()));
        self.vars
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self
    }

    /// Replace every `%name` reference in `expr` with its value
    pub fn substitute(&self, expr: &str) -> String {
        let mut out = expr.to_string();
        for (name, value) in &self.vars {
            for candidate in [name.to_string(), name.to_lowercase(), name.to_uppercase()] {
                let token = format!("%{}", candidate);
                if out.contains(&token) {
                    out = out.replace(&token, value);
                    break;
                }
            }
        }
        out
    }
}

/// Whether a substituted bare value counts as true
fn truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("none")
        || value.parse::<f64>().map(|n| n == 0.0).unwrap_or(false))
}

/// Evaluate one substituted condition
fn eval_condition(cond: &str) -> Option<bool> {
    // Two-character operators first so "<=" is not read as "<".
    for op in ["==", "!=", "<=", ">=", "<", ">"] {
        let Some(pos) = cond.find(op) else { continue };
        let lhs = cond[..pos].trim();
        let rhs = cond[pos + op.len()..].trim();
        if lhs.is_empty() || rhs.is_empty() {
            return None;
        }
        // A second operator in either side is malformed, not an expression.
        if [lhs, rhs]
            .iter()
            .any(|side| ["==", "!=", "<=", ">=", "<", ">"].iter().any(|o| side.contains(o)))
        {
            return None;
        }
        let result = match (lhs.parse::<f64>(), rhs.parse::<f64>()) {
            (Ok(l), Ok(r)) => match op {
                "==" => l == r,
                "!=" => l != r,
                "<=" => l <= r,
                ">=" => l >= r,
                "<" => l < r,
                ">" => l > r,
                _ => unreachable!(),
            },
            _ => {
                let (l, r) = (lhs.trim_matches('"'), rhs.trim_matches('"'));
                match op {
                    "==" => l == r,
                    "!=" => l != r,
                    "<=" => l <= r,
                    ">=" => l >= r,
                    "<" => l < r,
                    ">" => l > r,
                    _ => unreachable!(),
                }
            }
        };
        return Some(result);
    }
    Some(truthy(cond))
}

/// Collect the option strings contributed by a jobscript's conditional-option
/// lines, in file order
pub fn condopt_flags(
    jobscript: &Path,
    scheduler: Scheduler,
    vars: &CondoptVars,
) -> Result<Vec<String>> {
    let prefix = scheduler.condopt_prefix();
    let content = fs::read_to_string(jobscript)?;

    let mut flags = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let Some(remain) = line.trim_start().strip_prefix(prefix) else {
            continue;
        };
        let remain = remain.trim();

        let syntax_err = |message: &str| {
            Error::jobscript_syntax(
                jobscript,
                line_num,
                format!(
                    "{}; expected '{} <options> [IF <condition> [ELSE <options>]]'",
                    message, prefix
                ),
            )
        };

        let (remain, else_val) = match remain.split_once(" ELSE ") {
            Some((head, tail)) => (head.trim(), Some(tail.trim())),
            None => (remain, None),
        };
        let (if_val, condition) = match remain.split_once(" IF ") {
            Some((head, tail)) => (head.trim(), Some(tail.trim())),
            None => (remain, None),
        };

        let chosen = match condition {
            Some(cond) => {
                if if_val.is_empty() || cond.is_empty() {
                    return Err(syntax_err("empty options or condition"));
                }
                let cond = vars.substitute(cond);
                match eval_condition(&cond) {
                    Some(true) => Some(if_val),
                    Some(false) => else_val,
                    None => return Err(syntax_err("malformed condition")),
                }
            }
            None => {
                if else_val.is_some() {
                    return Err(syntax_err("ELSE without IF"));
                }
                if if_val.is_empty() {
                    return Err(syntax_err("empty options"));
                }
                Some(if_val)
            }
        };

        if let Some(options) = chosen {
            flags.push(vars.substitute(options));
        }
    }
    Ok(flags)
}
