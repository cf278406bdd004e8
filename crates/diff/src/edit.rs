use ropey::Rope;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chunk::{ChangeType, LineRange};
use crate::error::{DiffError, DiffResult};

/// A raw edit as reported by a line diff provider.
///
/// Both ranges are half-open line intervals. Lines between two consecutive
/// edits are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edit {
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

impl Edit {
    pub fn new(old_start: usize, old_end: usize, new_start: usize, new_end: usize) -> Self {
        Self {
            old_start,
            old_end,
            new_start,
            new_end,
        }
    }

    pub fn old_range(&self) -> LineRange {
        LineRange::from_range(self.old_start..self.old_end)
    }

    pub fn new_range(&self) -> LineRange {
        LineRange::from_range(self.new_start..self.new_end)
    }

    /// Classification implied by which side of the edit is empty
    pub fn change_type(&self) -> ChangeType {
        match (self.old_start == self.old_end, self.new_start == self.new_end) {
            (true, true) => ChangeType::Same,
            (true, false) => ChangeType::Add,
            (false, true) => ChangeType::Delete,
            (false, false) => ChangeType::Modify,
        }
    }
}

/// A whole-line replacement on the old side of a diff, with content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// Old-side lines being replaced
    pub old_range: LineRange,

    /// Current content of `old_range`
    pub old_text: String,

    /// Replacement content
    pub new_text: String,
}

impl LineEdit {
    pub fn new(old_range: LineRange, old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_range,
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    /// Number of lines the replacement occupies
    pub fn new_line_count(&self) -> usize {
        line_count(&self.new_text)
    }

    /// Net change in old-side line count caused by this edit
    pub fn line_delta(&self) -> isize {
        self.new_line_count() as isize - self.old_range.count as isize
    }

    /// Translate a character-level edit on `text` into the smallest whole-line edit.
    ///
    /// `offset` and `removed` are counted in characters. The resulting old range
    /// starts at the line holding `offset` and ends after the line holding
    /// `offset + removed`, unless the replacement already ends on a line
    /// boundary there.
    pub fn from_text_change(text: &Rope, offset: usize, inserted: &str, removed: usize) -> DiffResult<Self> {
        let text_len = text.len_chars();
        let end_char = offset
            .checked_add(removed)
            .filter(|end| *end <= text_len)
            .ok_or(DiffError::EditOutOfBounds {
                offset,
                len: removed,
                text_len,
            })?;

        let total = rope_line_count(text);
        let start_line = text.char_to_line(offset).min(total);
        let line_start = text.line_to_char(start_line);

        let mut head = text.slice(line_start..offset).to_string();
        head.push_str(inserted);

        let mut end_line = text.char_to_line(end_char);
        let on_boundary = text.line_to_char(end_line) == end_char;
        if !(on_boundary && (head.is_empty() || head.ends_with('\n'))) {
            end_line += 1;
        }
        let end_line = end_line.min(total).max(start_line);
        let end_char_of_range = text.line_to_char(end_line);

        let old_text = text.slice(line_start..end_char_of_range).to_string();
        let mut new_text = head;
        new_text.push_str(&text.slice(end_char..end_char_of_range).to_string());

        Ok(Self {
            old_range: LineRange::from_range(start_line..end_line),
            old_text,
            new_text,
        })
    }
}

/// Number of lines in `text`; a trailing partial line counts, a trailing empty line does not.
pub fn line_count(text: &str) -> usize {
    text.split_inclusive('\n').count()
}

/// Split `text` into lines keeping their terminators
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn rope_line_count(text: &Rope) -> usize {
    let lines = text.len_lines();
    if text.len_chars() == 0 || text.char(text.len_chars() - 1) == '\n' {
        lines - 1
    } else {
        lines
    }
}
