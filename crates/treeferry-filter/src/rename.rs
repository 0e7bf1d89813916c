//! Ordered rename (substitution) rules
//!
//! Rules rewrite a file or directory name on its way into the destination
//! tree. They apply only to names that already passed filtering, in the
//! order given, each rule replacing every occurrence of its pattern.

use regex::Regex;
use treeferry_types::{Error, Result};

/// An ordered list of (pattern, replacement) rewrite rules
#[derive(Debug, Clone, Default)]
pub struct RenameRules {
    rules: Vec<(Regex, String)>,
}

impl RenameRules {
    /// Compile rules from (pattern, replacement) string pairs
    pub fn compile(pairs: &[(String, String)]) -> Result<Self> {
        let mut rules = Vec::with_capacity(pairs.len());
        for (pattern, replacement) in pairs {
            let re = Regex::new(pattern).map_err(|e| {
                Error::config(format!("invalid rename pattern '{}': {}", pattern, e))
            })?;
            rules.push((re, replacement.clone()));
        }
        Ok(Self { rules })
    }

    /// Whether any rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order to `name`
    pub fn apply(&self, name: &str) -> String {
        let mut out = name.to_string();
        for (re, replacement) in &self.rules {
            out = re.replace_all(&out, replacement.as_str()).into_owned();
        }
        out
    }
}
