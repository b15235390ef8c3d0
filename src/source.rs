//! File table and source-location resolution.
//!
//! A [`SourceLocation`] is either a plain position in a file or a macro
//! location carrying two sides: where the characters are spelled and where
//! the expansion happens. Both sides may themselves be macro locations, so
//! resolution follows the chain until it reaches a file position.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identity of one file in a translation unit, assigned by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// A byte offset inside one file's original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileLoc {
    pub file: FileId,
    pub offset: usize,
}

impl FileLoc {
    pub fn new(file: FileId, offset: usize) -> Self {
        Self { file, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    Invalid,
    File(FileLoc),
    Macro {
        spelling: Box<SourceLocation>,
        expansion: Box<SourceLocation>,
    },
}

impl SourceLocation {
    pub fn file(file: FileId, offset: usize) -> Self {
        SourceLocation::File(FileLoc::new(file, offset))
    }

    pub fn macro_expansion(spelling: SourceLocation, expansion: SourceLocation) -> Self {
        SourceLocation::Macro {
            spelling: Box::new(spelling),
            expansion: Box::new(expansion),
        }
    }

    /// Where the characters of the token are literally written.
    pub fn spelling_loc(&self) -> Option<FileLoc> {
        match self {
            SourceLocation::Invalid => None,
            SourceLocation::File(loc) => Some(*loc),
            SourceLocation::Macro { spelling, .. } => spelling.spelling_loc(),
        }
    }

    /// Where the outermost macro expansion conceptually happens.
    pub fn expansion_loc(&self) -> Option<FileLoc> {
        match self {
            SourceLocation::Invalid => None,
            SourceLocation::File(loc) => Some(*loc),
            SourceLocation::Macro { expansion, .. } => expansion.expansion_loc(),
        }
    }

    pub fn resolve(&self, mode: LocationMode) -> Option<FileLoc> {
        match mode {
            LocationMode::Spelling => self.spelling_loc(),
            LocationMode::Expansion => self.expansion_loc(),
        }
    }
}

/// Which side of a macro location scope checks and edits are made against.
///
/// `Spelling` is the correct choice: an edit at the expansion side lands on
/// the macro invocation instead of the written token. `Expansion` reproduces
/// the older behavior and exists so the choice stays explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    #[default]
    Spelling,
    Expansion,
}

/// One entry of the file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: FileId,
    pub path: PathBuf,
    /// Set by the front end for headers found on a system include path.
    #[serde(default)]
    pub system: bool,
    /// Original text. Read from `path` when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("unknown {0}")]
    UnknownFile(FileId),

    #[error("duplicate {0} in file table")]
    DuplicateFile(FileId),

    #[error("main {0} is not in the file table")]
    MissingMainFile(FileId),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
struct LoadedFile {
    path: PathBuf,
    system: bool,
    content: String,
    line_starts: Vec<usize>,
}

/// Owns every file of one translation unit together with its original text.
#[derive(Debug, Clone)]
pub struct SourceManager {
    files: Vec<(FileId, LoadedFile)>,
    main_file: FileId,
}

impl SourceManager {
    /// Build the file table, reading from disk (relative to `source_dir`)
    /// any file the front end did not embed.
    pub fn new(
        entries: Vec<FileEntry>,
        main_file: FileId,
        source_dir: &Path,
    ) -> Result<Self, SourceError> {
        let mut files: Vec<(FileId, LoadedFile)> = Vec::with_capacity(entries.len());

        for entry in entries {
            if files.iter().any(|(id, _)| *id == entry.id) {
                return Err(SourceError::DuplicateFile(entry.id));
            }

            let content = match entry.content {
                Some(content) => content,
                None => {
                    let on_disk = if entry.path.is_absolute() {
                        entry.path.clone()
                    } else {
                        source_dir.join(&entry.path)
                    };
                    fs::read_to_string(&on_disk).map_err(|source| SourceError::Io {
                        path: on_disk,
                        source,
                    })?
                }
            };

            let line_starts = compute_line_starts(&content);
            files.push((
                entry.id,
                LoadedFile {
                    path: entry.path,
                    system: entry.system,
                    content,
                    line_starts,
                },
            ));
        }

        files.sort_by_key(|(id, _)| *id);

        if files.binary_search_by_key(&main_file, |(id, _)| *id).is_err() {
            return Err(SourceError::MissingMainFile(main_file));
        }

        Ok(Self { files, main_file })
    }

    fn get(&self, file: FileId) -> Result<&LoadedFile, SourceError> {
        self.files
            .binary_search_by_key(&file, |(id, _)| *id)
            .map(|idx| &self.files[idx].1)
            .map_err(|_| SourceError::UnknownFile(file))
    }

    pub fn main_file(&self) -> FileId {
        self.main_file
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.get(file).is_ok()
    }

    pub fn path(&self, file: FileId) -> Result<&Path, SourceError> {
        self.get(file).map(|f| f.path.as_path())
    }

    pub fn content(&self, file: FileId) -> Result<&str, SourceError> {
        self.get(file).map(|f| f.content.as_str())
    }

    pub fn is_system(&self, file: FileId) -> Result<bool, SourceError> {
        self.get(file).map(|f| f.system)
    }

    /// One-based line and column (in bytes) of a location.
    pub fn line_col(&self, loc: FileLoc) -> Result<(usize, usize), SourceError> {
        let file = self.get(loc.file)?;
        let line = match file.line_starts.binary_search(&loc.offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Ok((line + 1, loc.offset - file.line_starts[line] + 1))
    }
}

fn compute_line_starts(content: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}
