//! Which files a run rewrites.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The file path rewritten when neither the command line nor the rule table
/// names a target.
pub const DEFAULT_TARGET: &str = "src/webparts/library/LibraryWebPart.ts";

/// A single path, or a glob expanding to any number of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    Path(PathBuf),
    Glob(String),
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("invalid target glob '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to read target glob match: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("target glob '{pattern}' matched no files")]
    NoMatches { pattern: String },
}

impl TargetSelector {
    /// Anything containing a glob metacharacter is a glob, the rest a path.
    pub fn parse(selector: &str) -> Self {
        if selector.contains(['*', '?', '[']) {
            TargetSelector::Glob(selector.to_string())
        } else {
            TargetSelector::Path(PathBuf::from(selector))
        }
    }

    /// Expand to concrete file paths, relative ones joined onto `root`.
    ///
    /// A plain path is returned as-is even if it does not exist; loading it
    /// reports the I/O failure. A glob naming an existing file verbatim, such
    /// as `pages/[id].ts`, is that file. Otherwise a glob must match at least
    /// one file.
    pub fn resolve(&self, root: Option<&Path>) -> Result<Vec<PathBuf>, TargetError> {
        match self {
            TargetSelector::Path(path) => Ok(vec![join_root(root, path)]),
            TargetSelector::Glob(pattern) => {
                let literal = join_root(root, Path::new(pattern));
                if literal.is_file() {
                    return Ok(vec![literal]);
                }

                let full_pattern = match root {
                    Some(root) if Path::new(pattern).is_relative() => {
                        let escaped = glob::Pattern::escape(&root.to_string_lossy());
                        format!("{}/{}", escaped.trim_end_matches('/'), pattern)
                    }
                    _ => pattern.clone(),
                };

                let entries =
                    glob::glob(&full_pattern).map_err(|source| TargetError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })?;

                let mut files = Vec::new();
                for entry in entries {
                    let path = entry?;
                    if path.is_file() {
                        files.push(path);
                    }
                }
                files.sort();

                if files.is_empty() {
                    return Err(TargetError::NoMatches {
                        pattern: pattern.clone(),
                    });
                }
                tracing::debug!(pattern = %pattern, files = files.len(), "expanded target glob");
                Ok(files)
            }
        }
    }
}

fn join_root(root: Option<&Path>, path: &Path) -> PathBuf {
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        TargetSelector::Path(PathBuf::from(DEFAULT_TARGET))
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::Path(path) => write!(f, "{}", path.display()),
            TargetSelector::Glob(pattern) => write!(f, "{pattern}"),
        }
    }
}
