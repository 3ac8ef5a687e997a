use crate::transform::Transformation;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The in-memory text of one target file.
///
/// The path is fixed at load time; only the content changes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Document changes are lost unless save() is called"]
pub struct Document {
    path: PathBuf,
    content: String,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read the whole file as UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|source| DocumentError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Apply one transformation, returning the number of matches replaced.
    /// Zero matches leaves the content untouched.
    pub fn apply(&mut self, transformation: &Transformation) -> usize {
        let matches = transformation.count_matches(&self.content);
        if matches > 0 {
            if let Some(next) = transformation.rewrite(&self.content) {
                self.content = next;
            }
        }
        matches
    }

    /// Write the content back to the document's own path.
    pub fn save(&self) -> Result<(), DocumentError> {
        atomic_write(&self.path, self.content.as_bytes()).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the whole new content lands at `path` or the old file is left as it
/// was. No copy of the old content is kept. A symlinked `path` is written
/// through: the file it points to receives the content and the link stays.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let resolved = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(error) => return Err(error),
    };
    let path = resolved.as_path();

    // Same directory keeps the rename on one filesystem. A bare file name has
    // an empty parent, meaning the current directory.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = fs::metadata(path).ok().map(|m| m.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
