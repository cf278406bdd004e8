use derive_more::Display;
use log::debug;
use ropey::Rope;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chunk::{ChangeChunk, ChangeSide};
use crate::config::DiffConfig;
use crate::edit::{Edit, LineEdit};
use crate::error::{DiffError, DiffResult};
use crate::sequence::{AffectedChunks, ChunkSequence};

/// What happened to a file as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FileChangeType {
    /// Add a new file
    #[display(fmt = "Add")]
    Add,

    /// Modify an existing file (content and/or mode)
    #[display(fmt = "Modify")]
    Modify,

    /// Delete an existing file
    #[display(fmt = "Delete")]
    Delete,

    /// Rename an existing file to a new location
    #[display(fmt = "Rename")]
    Rename,

    /// Copy an existing file to a new location, keeping the original
    #[display(fmt = "Copy")]
    Copy,
}

/// Identity of the two texts being compared.
///
/// The core never reads files; paths and encodings are carried for the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileHeader {
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub change_type: Option<FileChangeType>,
    pub old_encoding: Option<String>,
    pub new_encoding: Option<String>,
}

impl FileHeader {
    pub fn new(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self {
            old_path: Some(old_path.into()),
            new_path: Some(new_path.into()),
            ..Self::default()
        }
    }

    pub fn with_change_type(mut self, change_type: FileChangeType) -> Self {
        self.change_type = Some(change_type);
        self
    }

    pub fn with_encodings(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.old_encoding = Some(old.into());
        self.new_encoding = Some(new.into());
        self
    }

    pub fn path(&self, side: ChangeSide) -> Option<&Path> {
        match side {
            ChangeSide::Old => self.old_path.as_deref(),
            ChangeSide::New => self.new_path.as_deref(),
        }
    }

    pub fn encoding(&self, side: ChangeSide) -> Option<&str> {
        match side {
            ChangeSide::Old => self.old_encoding.as_deref(),
            ChangeSide::New => self.new_encoding.as_deref(),
        }
    }
}

/// The chunked comparison of one old text against one new text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Identity of the compared texts
    header: FileHeader,

    /// The chunks in this diff
    chunks: ChunkSequence,
}

impl FileDiff {
    /// Create a new diff between two texts
    pub fn new(header: FileHeader, old_text: &str, new_text: &str, config: &DiffConfig) -> DiffResult<Self> {
        let edits = config.edits(old_text, new_text);
        Self::from_edits(header, old_text, new_text, &edits)
    }

    /// Create a diff from edits computed elsewhere
    pub fn from_edits(header: FileHeader, old_text: &str, new_text: &str, edits: &[Edit]) -> DiffResult<Self> {
        let chunks = ChunkSequence::from_edits(old_text, new_text, edits)?;
        Ok(Self { header, chunks })
    }

    /// Diff two texts with the default settings
    pub fn from_texts(old_text: &str, new_text: &str) -> DiffResult<Self> {
        DiffConfig::default().diff(old_text, new_text)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The file-level change, derived from the content when the header does not say
    pub fn change_type(&self) -> FileChangeType {
        if let Some(change_type) = self.header.change_type {
            return change_type;
        }
        let old_empty = self.lines_on_side(ChangeSide::Old) == 0;
        let new_empty = self.lines_on_side(ChangeSide::New) == 0;
        match (old_empty, new_empty) {
            (true, false) => FileChangeType::Add,
            (false, true) => FileChangeType::Delete,
            _ => FileChangeType::Modify,
        }
    }

    /// Get the chunks, in order
    pub fn change_chunks(&self) -> &[ChangeChunk] {
        self.chunks.chunks()
    }

    /// Get a chunk by index
    pub fn chunk(&self, index: usize) -> DiffResult<&ChangeChunk> {
        self.chunks.chunk(index)
    }

    pub fn sequence(&self) -> &ChunkSequence {
        &self.chunks
    }

    pub fn sequence_mut(&mut self) -> &mut ChunkSequence {
        &mut self.chunks
    }

    pub fn lines_on_side(&self, side: ChangeSide) -> usize {
        self.chunks.line_count(side)
    }

    pub fn text_on_side(&self, side: ChangeSide) -> String {
        self.chunks.text(side)
    }

    pub fn has_changes(&self) -> bool {
        self.chunks.has_changes()
    }

    /// Apply a character-level edit made to the old-side text.
    ///
    /// `offset` and `removed_length` count characters of the current old text.
    pub fn apply_live_edit(&mut self, offset: usize, inserted_text: &str, removed_length: usize) -> DiffResult<()> {
        let old_text = Rope::from_str(&self.chunks.text(ChangeSide::Old));
        let edit = LineEdit::from_text_change(&old_text, offset, inserted_text, removed_length)?;
        debug!(
            "live edit at {} (+{} chars, -{} chars) -> lines {:?}",
            offset,
            inserted_text.chars().count(),
            removed_length,
            edit.old_range.to_range()
        );
        self.apply_line_edit(&edit)?;
        Ok(())
    }

    /// Apply a whole-line edit to the old side
    pub fn apply_line_edit(&mut self, edit: &LineEdit) -> DiffResult<AffectedChunks> {
        self.chunks.apply_edit(edit)
    }

    /// Install a recomputed sequence in one step.
    ///
    /// The sequence must describe the same old text as the current one.
    pub fn replace_chunks(&mut self, chunks: ChunkSequence) -> DiffResult<()> {
        if chunks.text(ChangeSide::Old) != self.chunks.text(ChangeSide::Old) {
            return Err(DiffError::invariant(
                "replacement chunks describe a different old text",
            ));
        }
        self.chunks.replace(chunks)
    }

    /// Re-diff the current texts of both sides and install the result
    pub fn recompute(&mut self, config: &DiffConfig) -> DiffResult<()> {
        let old_text = self.text_on_side(ChangeSide::Old);
        let new_text = self.text_on_side(ChangeSide::New);
        let edits = config.edits(&old_text, &new_text);
        let chunks = ChunkSequence::from_edits(&old_text, &new_text, &edits)?;
        self.replace_chunks(chunks)
    }
}
