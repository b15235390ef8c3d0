use crate::source::{FileId, FileLoc, SourceError};
use thiserror::Error;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Offsets always refer to the file's original text, never to a partially
/// rewritten one, so edits can be scheduled in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until scheduled on a Rewriter"]
pub struct Edit {
    pub file: FileId,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Original text the span must still hold when the edit is scheduled
    pub expected_before: String,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("before-text verification failed at {file}:{byte_start}: expected {expected:?}, found {found:?}")]
    BeforeTextMismatch {
        file: FileId,
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in {file} of length {file_len}")]
    InvalidByteRange {
        file: FileId,
        byte_start: usize,
        byte_end: usize,
        file_len: usize,
    },

    #[error("edit at {file}:[{byte_start}, {byte_end}) overlaps an edit at [{other_start}, {other_end})")]
    Overlap {
        file: FileId,
        byte_start: usize,
        byte_end: usize,
        other_start: usize,
        other_end: usize,
    },

    #[error("edit at {file}:{byte_start} does not fall on a UTF-8 character boundary")]
    InvalidUtf8Edit { file: FileId, byte_start: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result of scheduling an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "EditResult should be checked for scheduled/already-scheduled"]
pub enum EditResult {
    Scheduled,
    /// An identical edit was already recorded for this span.
    AlreadyScheduled,
}

impl Edit {
    /// Create a new edit that is only valid where `expected_before` is spelled.
    pub fn new(
        file: FileId,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            file,
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: expected_before.to_string(),
        }
    }

    /// Replace the identifier `old_name` spelled at `loc` with `new_name`.
    pub fn rename(loc: FileLoc, old_name: &str, new_name: impl Into<String>) -> Self {
        Self::new(
            loc.file,
            loc.offset,
            loc.offset + old_name.len(),
            new_name,
            old_name,
        )
    }

    pub fn len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_start == self.byte_end
    }

    /// Validate the edit against the file's original text.
    pub(crate) fn validate(&self, content: &str) -> Result<(), EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                file: self.file,
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                file_len: content.len(),
            });
        }

        if !content.is_char_boundary(self.byte_start) || !content.is_char_boundary(self.byte_end)
        {
            return Err(EditError::InvalidUtf8Edit {
                file: self.file,
                byte_start: self.byte_start,
            });
        }

        let current_text = &content[self.byte_start..self.byte_end];
        if current_text != self.expected_before {
            return Err(EditError::BeforeTextMismatch {
                file: self.file,
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: self.expected_before.clone(),
                found: current_text.to_string(),
            });
        }

        Ok(())
    }
}
