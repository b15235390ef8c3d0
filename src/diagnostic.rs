//! Advisory diagnostics emitted while renaming.
//!
//! Diagnostics never stop a run. They are collected in a [`Diagnostics`]
//! sink owned by the run and rendered by the caller.

use crate::source::{FileId, FileLoc, SourceError, SourceManager};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: FileId,
    pub path: PathBuf,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// The offending name.
    pub name: String,
    /// Corrected name, if one was computed.
    pub suggestion: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} '{}'",
            self.path.display(),
            self.line,
            self.column,
            self.severity,
            self.message,
            self.name
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (rename to '{suggestion}')")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(
        &mut self,
        sources: &SourceManager,
        loc: FileLoc,
        message: &str,
        name: &str,
        suggestion: Option<String>,
    ) -> Result<(), SourceError> {
        let (line, column) = sources.line_col(loc)?;
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            message: message.to_string(),
            file: loc.file,
            path: sources.path(loc.file)?.to_path_buf(),
            offset: loc.offset,
            line,
            column,
            name: name.to_string(),
            suggestion,
        };
        tracing::debug!(%diagnostic, "naming violation");
        self.items.push(diagnostic);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}
