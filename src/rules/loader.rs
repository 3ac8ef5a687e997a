use crate::rules::schema::{RuleTable, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// The rule table compiled into the binary; used when no `--rules` is given.
pub const BUILTIN_RULES: &str = include_str!("builtin.toml");

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("failed to read rule table from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to scan rule directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("no .toml rule files found in {}", .path.display())]
    EmptyDirectory { path: PathBuf },

    #[error("failed to parse rule table TOML{}: {source}", location(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid rule table{}: {source}", location(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },

    #[error("rule '{id}' has an invalid pattern: {source}")]
    Pattern { id: String, source: regex::Error },
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

impl RuleError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            RuleError::Toml { path: None, source } => RuleError::Toml {
                path: Some(path),
                source,
            },
            RuleError::Validation { path: None, source } => RuleError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

fn parse_str(input: &str) -> Result<RuleTable, RuleError> {
    toml_edit::de::from_str(input).map_err(|source| RuleError::Toml { path: None, source })
}

fn validated(table: RuleTable) -> Result<RuleTable, RuleError> {
    table
        .validate()
        .map_err(|source| RuleError::Validation { path: None, source })?;
    Ok(table)
}

pub fn load_from_str(input: &str) -> Result<RuleTable, RuleError> {
    validated(parse_str(input)?)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleTable, RuleError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Load every `*.toml` file directly inside `dir`, sorted by file name, and
/// concatenate their rules in that order.
pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<RuleTable, RuleError> {
    let dir = dir.as_ref();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.map_err(|source| RuleError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(RuleError::EmptyDirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut table = RuleTable::default();
    for file in &files {
        let contents = fs::read_to_string(file).map_err(|source| RuleError::Io {
            path: file.clone(),
            source,
        })?;
        let part = parse_str(&contents).map_err(|error| error.with_path(file))?;
        tracing::debug!(file = %file.display(), rules = part.rules.len(), "loaded rule file");
        table.extend(part);
    }

    validated(table).map_err(|error| error.with_path(dir))
}

/// Load a rule table from a file or a directory of rule files.
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleTable, RuleError> {
    let path = path.as_ref();
    if path.is_dir() {
        load_from_dir(path)
    } else {
        load_from_path(path)
    }
}

pub fn builtin() -> Result<RuleTable, RuleError> {
    load_from_str(BUILTIN_RULES)
}
