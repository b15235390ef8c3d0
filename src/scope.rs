//! Decides which locations belong to the project being renamed.

use crate::source::{FileId, FileLoc, LocationMode, SourceError, SourceLocation, SourceManager};
use std::collections::BTreeSet;

/// Deduplicated, ordered set of files the filter accepted at least once.
pub type TouchedFiles = BTreeSet<FileId>;

/// Accepts locations in the main file or in any file whose directory path
/// contains `root_dir`.
///
/// The root test is a raw substring match on the directory path: a root of
/// `src` also accepts `/opt/resources/include`.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    root_dir: String,
    mode: LocationMode,
    touched: TouchedFiles,
}

impl ScopeFilter {
    pub fn new(root_dir: impl Into<String>, mode: LocationMode) -> Self {
        Self {
            root_dir: root_dir.into(),
            mode,
            touched: TouchedFiles::new(),
        }
    }

    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    /// Resolve `loc` and return it when in scope, without recording anything.
    pub fn in_scope(
        &self,
        sources: &SourceManager,
        loc: &SourceLocation,
    ) -> Result<Option<FileLoc>, SourceError> {
        let Some(resolved) = loc.resolve(self.mode) else {
            return Ok(None);
        };

        if sources.is_system(resolved.file)? {
            return Ok(None);
        }

        if resolved.file == sources.main_file() {
            return Ok(Some(resolved));
        }

        let dir = sources
            .path(resolved.file)?
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(dir.contains(&self.root_dir).then_some(resolved))
    }

    /// Like [`ScopeFilter::in_scope`], and record the owning file as touched
    /// on acceptance.
    pub fn accept(
        &mut self,
        sources: &SourceManager,
        loc: &SourceLocation,
    ) -> Result<Option<FileLoc>, SourceError> {
        let accepted = self.in_scope(sources, loc)?;
        match accepted {
            Some(resolved) => {
                self.touched.insert(resolved.file);
            }
            None => tracing::trace!(?loc, "location out of scope"),
        }
        Ok(accepted)
    }

    pub fn touched(&self) -> &TouchedFiles {
        &self.touched
    }

    pub fn into_touched(self) -> TouchedFiles {
        self.touched
    }
}
