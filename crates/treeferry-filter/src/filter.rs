//! Include/exclude name filtering
//!
//! A [`NameFilter`] holds compiled include and exclude pattern sets for one
//! class of names (files or directories). Evaluation short-circuits on the
//! first hit within each set. An empty include set matches everything and an
//! empty exclude set excludes nothing.

use crate::glob::glob_to_regex;
use regex::Regex;
use treeferry_types::{Error, Result};

/// Uncompiled pattern sets for one name class
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Glob include patterns
    pub include_globs: Vec<String>,
    /// Raw regex include patterns
    pub include_regexes: Vec<String>,
    /// Glob exclude patterns
    pub exclude_globs: Vec<String>,
    /// Raw regex exclude patterns
    pub exclude_regexes: Vec<String>,
    /// Match anywhere in the name instead of requiring a full-string match
    pub partial: bool,
}

impl FilterSpec {
    /// Compile all patterns, failing with a configuration error on the first
    /// invalid one
    pub fn compile(&self) -> Result<NameFilter> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for pattern in &self.include_globs {
            include.push(compile_one(&glob_to_regex(pattern, self.partial))?);
        }
        for pattern in &self.include_regexes {
            include.push(compile_one(&anchor(pattern, self.partial))?);
        }
        for pattern in &self.exclude_globs {
            exclude.push(compile_one(&glob_to_regex(pattern, self.partial))?);
        }
        for pattern in &self.exclude_regexes {
            exclude.push(compile_one(&anchor(pattern, self.partial))?);
        }

        Ok(NameFilter { include, exclude })
    }
}

fn anchor(pattern: &str, partial: bool) -> String {
    if partial {
        pattern.to_string()
    } else {
        format!("\\A(?:{})\\z", pattern)
    }
}

fn compile_one(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("invalid match pattern '{}': {}", pattern, e)))
}

/// Compiled include/exclude filter for one class of names
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl NameFilter {
    /// A filter with no patterns: accepts every name
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no patterns are configured at all
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether any include patterns are configured
    pub fn has_includes(&self) -> bool {
        !self.include.is_empty()
    }

    /// Inclusion test: an empty include set matches everything
    pub fn matches(&self, name: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(name))
    }

    /// Exclusion test: an empty exclude set excludes nothing
    pub fn excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(name))
    }

    /// Combined verdict: included and not excluded
    pub fn accepts(&self, name: &str) -> bool {
        self.matches(name) && !self.excluded(name)
    }
}
