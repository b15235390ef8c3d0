//! Per-file rewrite buffers.
//!
//! A [`Rewriter`] lives for exactly one run: created before traversal,
//! filled while the engine walks the tree, consumed by [`Rewriter::flush`].

use crate::edit::{Edit, EditError, EditResult};
use crate::scope::TouchedFiles;
use crate::source::{FileId, SourceManager};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Edited view of one file's original text.
///
/// Edits are keyed by their start offset in the original text. Two edits may
/// not overlap; scheduling an edit identical to a recorded one is a no-op.
#[derive(Debug, Clone)]
pub struct RewriteBuffer<'s> {
    file: FileId,
    original: &'s str,
    edits: BTreeMap<usize, Edit>,
}

impl<'s> RewriteBuffer<'s> {
    pub fn new(file: FileId, original: &'s str) -> Self {
        Self {
            file,
            original,
            edits: BTreeMap::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    pub fn schedule(&mut self, edit: Edit) -> Result<EditResult, EditError> {
        edit.validate(self.original)?;

        if let Some(existing) = self.edits.get(&edit.byte_start) {
            if existing.byte_end == edit.byte_end && existing.new_text == edit.new_text {
                return Ok(EditResult::AlreadyScheduled);
            }
            return Err(self.overlap(&edit, existing));
        }

        // edits are non-overlapping, so only the two neighbours can collide
        if let Some((_, before)) = self.edits.range(..edit.byte_start).next_back() {
            if before.byte_end > edit.byte_start {
                return Err(self.overlap(&edit, before));
            }
        }
        if let Some((_, after)) = self.edits.range(edit.byte_start..).next() {
            if after.byte_start < edit.byte_end {
                return Err(self.overlap(&edit, after));
            }
        }

        self.edits.insert(edit.byte_start, edit);
        Ok(EditResult::Scheduled)
    }

    fn overlap(&self, edit: &Edit, other: &Edit) -> EditError {
        EditError::Overlap {
            file: self.file,
            byte_start: edit.byte_start,
            byte_end: edit.byte_end,
            other_start: other.byte_start,
            other_end: other.byte_end,
        }
    }

    /// Full text with every scheduled edit applied.
    pub fn materialize(&self) -> String {
        let delta: isize = self
            .edits
            .values()
            .map(|e| e.new_text.len() as isize - e.len() as isize)
            .sum();
        let mut out = String::with_capacity((self.original.len() as isize + delta).max(0) as usize);

        let mut cursor = 0;
        for edit in self.edits.values() {
            out.push_str(&self.original[cursor..edit.byte_start]);
            out.push_str(&edit.new_text);
            cursor = edit.byte_end;
        }
        out.push_str(&self.original[cursor..]);
        out
    }
}

/// What a flush reports for one touched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: FileId,
    pub path: PathBuf,
    pub change: FileChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Rewritten {
        original: String,
        content: String,
        edits: usize,
    },
    Unchanged,
}

impl FileOutcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self.change, FileChange::Rewritten { .. })
    }
}

/// One lazily created buffer per edited file.
#[derive(Debug)]
pub struct Rewriter<'s> {
    sources: &'s SourceManager,
    buffers: BTreeMap<FileId, RewriteBuffer<'s>>,
}

impl<'s> Rewriter<'s> {
    pub fn new(sources: &'s SourceManager) -> Self {
        Self {
            sources,
            buffers: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, edit: Edit) -> Result<EditResult, EditError> {
        let sources: &'s SourceManager = self.sources;
        let buffer = match self.buffers.entry(edit.file) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let original = sources.content(edit.file)?;
                entry.insert(RewriteBuffer::new(edit.file, original))
            }
        };
        buffer.schedule(edit)
    }

    /// Report every touched file once, in file order: the rewritten text for
    /// files that received edits, `Unchanged` for the rest.
    pub fn flush(self, touched: &TouchedFiles) -> Result<Vec<FileOutcome>, EditError> {
        let mut outcomes = Vec::with_capacity(touched.len());

        for &file in touched {
            let path = self.sources.path(file)?.to_path_buf();
            let change = match self.buffers.get(&file) {
                Some(buffer) if buffer.edit_count() > 0 => FileChange::Rewritten {
                    original: buffer.original.to_string(),
                    content: buffer.materialize(),
                    edits: buffer.edit_count(),
                },
                _ => FileChange::Unchanged,
            };
            outcomes.push(FileOutcome { file, path, change });
        }

        Ok(outcomes)
    }
}
