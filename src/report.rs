//! What a run did, per target and per rule.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Coarse match count used by the diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCount {
    None,
    Once,
    Many(usize),
}

impl From<usize> for MatchCount {
    fn from(count: usize) -> Self {
        match count {
            0 => MatchCount::None,
            1 => MatchCount::Once,
            n => MatchCount::Many(n),
        }
    }
}

impl fmt::Display for MatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCount::None => write!(f, "no match"),
            MatchCount::Once => write!(f, "matched once"),
            MatchCount::Many(n) => write!(f, "matched {n} times"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub id: String,
    pub matches: usize,
}

impl RuleOutcome {
    pub fn count(&self) -> MatchCount {
        MatchCount::from(self.matches)
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.count())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// One entry per rule, in the order the rules ran.
    pub rules: Vec<RuleOutcome>,
    pub changed: bool,
    pub written: bool,
    #[serde(skip)]
    pub original: String,
    #[serde(skip)]
    pub patched: String,
}

impl FileReport {
    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules.iter().filter(|rule| rule.matches == 0)
    }

    pub fn total_matches(&self) -> usize {
        self.rules.iter().map(|rule| rule.matches).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn changed_files(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|file| file.changed)
            .map(|file| file.path.as_path())
    }

    pub fn any_changed(&self) -> bool {
        self.files.iter().any(|file| file.changed)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
