use derive_more::Display;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of a single chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeType {
    /// Identical content on both sides
    #[display(fmt = "Same")]
    Same,

    /// Lines only exist on the new side
    #[display(fmt = "Add")]
    Add,

    /// Lines only exist on the old side
    #[display(fmt = "Delete")]
    Delete,

    /// Lines exist on both sides but differ
    #[display(fmt = "Modify")]
    Modify,
}

impl ChangeType {
    /// Derive the classification from the literal content of both sides
    pub fn classify(old_text: &str, new_text: &str) -> Self {
        if old_text == new_text {
            ChangeType::Same
        } else if old_text.is_empty() {
            ChangeType::Add
        } else if new_text.is_empty() {
            ChangeType::Delete
        } else {
            ChangeType::Modify
        }
    }
}

/// Decision taken on a chunk inside a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChunkStatus {
    #[display(fmt = "Pending")]
    Pending,

    #[display(fmt = "Accepted")]
    Accepted,

    #[display(fmt = "Discarded")]
    Discarded,
}

/// Conflict state of a chunk relative to the opposing side of a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConflictType {
    /// Only one side changed the region, or both made the same change
    #[display(fmt = "NonConflicting")]
    NonConflicting,

    /// Both sides changed the same base region differently
    #[display(fmt = "Conflicting")]
    Conflicting,

    /// A conflicting region the user has already decided
    #[display(fmt = "Resolved")]
    Resolved,
}

/// One of the two texts compared by a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeSide {
    /// The original (base) text
    #[display(fmt = "Old")]
    Old,

    /// The changed text
    #[display(fmt = "New")]
    New,
}

/// Represents a range of lines in a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineRange {
    /// The starting line (0-based)
    pub start: usize,

    /// The number of lines
    pub count: usize,
}

impl LineRange {
    /// Create a new range from start and count
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// Create a range from a start and end (exclusive)
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            count: range.end.saturating_sub(range.start),
        }
    }

    /// Convert to a standard Range
    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Get the end of the range (exclusive)
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    /// Check if this range is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if this range contains the given line
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end()
    }

    /// Half-open interval overlap
    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start < other.end() && self.end() > other.start
    }

    /// The same range moved by `delta` lines
    pub fn shifted(&self, delta: isize) -> Self {
        Self {
            start: self.start.saturating_add_signed(delta),
            count: self.count,
        }
    }
}

/// An aligned region between the old and the new text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeChunk {
    /// Lines of the old (base) text covered by this chunk
    pub old_range: LineRange,

    /// Lines of the new text covered by this chunk
    pub new_range: LineRange,

    /// The classification of the chunk
    pub change_type: ChangeType,

    /// Literal old-side content, line terminators included
    pub old_text: String,

    /// Literal new-side content, line terminators included
    pub new_text: String,

    /// Merge decision; `None` outside of a merge
    pub status: Option<ChunkStatus>,

    /// Merge classification; `None` outside of a merge
    pub conflict: Option<ConflictType>,
}

impl ChangeChunk {
    /// Create a chunk outside of any merge context
    pub fn new(
        change_type: ChangeType,
        old_range: LineRange,
        new_range: LineRange,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            old_range,
            new_range,
            change_type,
            old_text: old_text.into(),
            new_text: new_text.into(),
            status: None,
            conflict: None,
        }
    }

    /// Create a chunk whose type is derived from its content
    pub fn from_content(
        old_range: LineRange,
        new_range: LineRange,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        let old_text = old_text.into();
        let new_text = new_text.into();
        let change_type = ChangeType::classify(&old_text, &new_text);
        Self::new(change_type, old_range, new_range, old_text, new_text)
    }

    pub fn range(&self, side: ChangeSide) -> &LineRange {
        match side {
            ChangeSide::Old => &self.old_range,
            ChangeSide::New => &self.new_range,
        }
    }

    pub fn text(&self, side: ChangeSide) -> &str {
        match side {
            ChangeSide::Old => &self.old_text,
            ChangeSide::New => &self.new_text,
        }
    }

    /// Number of lines this chunk spans on the given side
    pub fn len_on_side(&self, side: ChangeSide) -> usize {
        self.range(side).count
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn status(&self) -> Option<ChunkStatus> {
        self.status
    }

    pub fn set_status(&mut self, status: ChunkStatus) {
        self.status = Some(status);
    }

    pub fn conflict(&self) -> Option<ConflictType> {
        self.conflict
    }

    pub fn set_conflict(&mut self, conflict: ConflictType) {
        self.conflict = Some(conflict);
    }

    /// Whether the chunk still awaits a merge decision (always true outside a merge)
    pub fn is_pending(&self) -> bool {
        matches!(self.status, None | Some(ChunkStatus::Pending))
    }

    /// Check if this chunk has any changes
    pub fn has_changes(&self) -> bool {
        self.change_type != ChangeType::Same
    }

    /// Get the number of added lines in this chunk
    pub fn added_lines(&self) -> usize {
        match self.change_type {
            ChangeType::Add | ChangeType::Modify => self.new_range.count,
            ChangeType::Same | ChangeType::Delete => 0,
        }
    }

    /// Get the number of deleted lines in this chunk
    pub fn deleted_lines(&self) -> usize {
        match self.change_type {
            ChangeType::Delete | ChangeType::Modify => self.old_range.count,
            ChangeType::Same | ChangeType::Add => 0,
        }
    }
}
