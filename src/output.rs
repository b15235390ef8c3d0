//! Persist rewritten files under an output root that mirrors their paths.

use crate::rewrite::{FileChange, FileOutcome};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("path escapes the output root: {0}")]
    EscapesRoot(PathBuf),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one touched file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "WriteReport should be checked for written/up-to-date"]
pub enum WriteReport {
    Written { source: PathBuf, target: PathBuf },
    /// Target already holds identical content.
    UpToDate { source: PathBuf, target: PathBuf },
    /// Dry run: the target would have been written.
    WouldWrite { source: PathBuf, target: PathBuf },
    Unchanged { source: PathBuf },
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    dry_run: bool,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root` joined with `path` stripped of its root and prefix components.
    ///
    /// `.` components are dropped; a `..` component is rejected so nothing
    /// can be written outside the root.
    pub fn target_path(&self, path: &Path) -> Result<PathBuf, OutputError> {
        let mut target = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => return Err(OutputError::EscapesRoot(path.to_path_buf())),
            }
        }
        if target == self.root {
            return Err(OutputError::EscapesRoot(path.to_path_buf()));
        }
        Ok(target)
    }

    pub fn write(&self, outcome: &FileOutcome) -> Result<WriteReport, OutputError> {
        let source = outcome.path.clone();
        let FileChange::Rewritten { content, .. } = &outcome.change else {
            return Ok(WriteReport::Unchanged { source });
        };

        let target = self.target_path(&outcome.path)?;

        if let Ok(existing) = fs::read(&target) {
            if xxh3_64(&existing) == xxh3_64(content.as_bytes()) {
                return Ok(WriteReport::UpToDate { source, target });
            }
        }

        if self.dry_run {
            return Ok(WriteReport::WouldWrite { source, target });
        }

        let parent = target
            .parent()
            .ok_or_else(|| OutputError::EscapesRoot(outcome.path.clone()))?;
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
        atomic_write(&target, content.as_bytes()).map_err(|source| OutputError::Write {
            path: target.clone(),
            source,
        })?;

        tracing::info!(target = %target.display(), "wrote rewritten file");
        Ok(WriteReport::Written { source, target })
    }

    pub fn write_all(&self, outcomes: &[FileOutcome]) -> Result<Vec<WriteReport>, OutputError> {
        outcomes.iter().map(|o| self.write(o)).collect()
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// This ensures crash safety - either the full write succeeds or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
