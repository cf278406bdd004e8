use log::trace;
use smallvec::SmallVec;

use crate::chunk::{ChangeChunk, ChangeSide, ChangeType, ChunkStatus, ConflictType, LineRange};
use crate::edit::{split_lines, Edit, LineEdit};
use crate::error::{DiffError, DiffResult};

/// Indices of the chunks touched by an edit, in ascending order
pub type AffectedChunks = SmallVec<[usize; 4]>;

/// Line shift applied to chunks downstream of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineDelta {
    pub old: isize,
    pub new: isize,
}

impl LineDelta {
    /// Shift both sides by the same amount
    pub fn uniform(delta: isize) -> Self {
        Self {
            old: delta,
            new: delta,
        }
    }

    /// Shift only the old side
    pub fn old_side(delta: isize) -> Self {
        Self { old: delta, new: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.old == 0 && self.new == 0
    }
}

/// An ordered, gap-free partition of the old and new line space into chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSequence {
    chunks: Vec<ChangeChunk>,
}

impl ChunkSequence {
    /// Build a sequence from the raw edits of a diff provider.
    ///
    /// Lines between edits become `Same` chunks. Empty texts yield a single
    /// empty `Same` chunk so that every sequence has somewhere to put an insertion.
    pub fn from_edits(old_text: &str, new_text: &str, edits: &[Edit]) -> DiffResult<Self> {
        let old_lines = split_lines(old_text);
        let new_lines = split_lines(new_text);

        let mut chunks = Vec::with_capacity(edits.len() * 2 + 1);
        let mut old_pos = 0;
        let mut new_pos = 0;

        for edit in edits {
            if edit.old_start < old_pos
                || edit.new_start < new_pos
                || edit.old_end < edit.old_start
                || edit.new_end < edit.new_start
            {
                return Err(DiffError::invariant(format!(
                    "edit {:?} is out of order or malformed",
                    edit
                )));
            }
            if edit.old_end > old_lines.len() || edit.new_end > new_lines.len() {
                return Err(DiffError::invariant(format!(
                    "edit {:?} exceeds texts of {} and {} lines",
                    edit,
                    old_lines.len(),
                    new_lines.len()
                )));
            }

            // Unchanged gap before the edit
            let gap = edit.old_start - old_pos;
            if gap != edit.new_start - new_pos {
                return Err(DiffError::invariant(format!(
                    "unchanged gap before edit {:?} differs in length between sides",
                    edit
                )));
            }
            if gap > 0 {
                chunks.push(ChangeChunk::new(
                    ChangeType::Same,
                    LineRange::new(old_pos, gap),
                    LineRange::new(new_pos, gap),
                    old_lines[old_pos..edit.old_start].concat(),
                    new_lines[new_pos..edit.new_start].concat(),
                ));
            }

            if edit.change_type() != ChangeType::Same {
                chunks.push(ChangeChunk::new(
                    edit.change_type(),
                    edit.old_range(),
                    edit.new_range(),
                    old_lines[edit.old_start..edit.old_end].concat(),
                    new_lines[edit.new_start..edit.new_end].concat(),
                ));
            }

            old_pos = edit.old_end;
            new_pos = edit.new_end;
        }

        // Trailing unchanged lines
        let tail = old_lines.len() - old_pos;
        if tail != new_lines.len() - new_pos {
            return Err(DiffError::invariant(
                "unchanged tail differs in length between sides",
            ));
        }
        if tail > 0 || chunks.is_empty() {
            chunks.push(ChangeChunk::new(
                ChangeType::Same,
                LineRange::new(old_pos, tail),
                LineRange::new(new_pos, tail),
                old_lines[old_pos..].concat(),
                new_lines[new_pos..].concat(),
            ));
        }

        Ok(Self { chunks })
    }

    /// Build a sequence from ready-made chunks, checking contiguity
    pub fn from_chunks(chunks: Vec<ChangeChunk>) -> DiffResult<Self> {
        let sequence = Self { chunks };
        sequence.validate()?;
        Ok(sequence)
    }

    /// Check that the chunks partition both line spaces without gaps
    pub fn validate(&self) -> DiffResult<()> {
        let Some(first) = self.chunks.first() else {
            return Err(DiffError::invariant("chunk sequence is empty"));
        };
        if first.old_range.start != 0 || first.new_range.start != 0 {
            return Err(DiffError::invariant("first chunk does not start at line 0"));
        }
        for (index, pair) in self.chunks.windows(2).enumerate() {
            if pair[0].old_range.end() != pair[1].old_range.start {
                return Err(DiffError::invariant(format!(
                    "old side gap between chunk {} ({:?}) and chunk {} ({:?})",
                    index,
                    pair[0].old_range,
                    index + 1,
                    pair[1].old_range
                )));
            }
            if pair[0].new_range.end() != pair[1].new_range.start {
                return Err(DiffError::invariant(format!(
                    "new side gap between chunk {} and chunk {}",
                    index,
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Get the chunks
    pub fn chunks(&self) -> &[ChangeChunk] {
        &self.chunks
    }

    /// Get a chunk by index
    pub fn get(&self, index: usize) -> Option<&ChangeChunk> {
        self.chunks.get(index)
    }

    /// Get a chunk by index or report it as missing
    pub fn chunk(&self, index: usize) -> DiffResult<&ChangeChunk> {
        self.chunks.get(index).ok_or(DiffError::ChunkOutOfRange {
            index,
            len: self.chunks.len(),
        })
    }

    fn chunk_mut(&mut self, index: usize) -> DiffResult<&mut ChangeChunk> {
        let len = self.chunks.len();
        self.chunks
            .get_mut(index)
            .ok_or(DiffError::ChunkOutOfRange { index, len })
    }

    /// Record a merge decision on one chunk
    pub fn set_status(&mut self, index: usize, status: ChunkStatus) -> DiffResult<()> {
        self.chunk_mut(index)?.set_status(status);
        Ok(())
    }

    /// Record a merge decision on every chunk
    pub fn set_all_status(&mut self, status: ChunkStatus) {
        for chunk in &mut self.chunks {
            chunk.set_status(status);
        }
    }

    pub fn set_conflict(&mut self, index: usize, conflict: ConflictType) -> DiffResult<()> {
        self.chunk_mut(index)?.set_conflict(conflict);
        Ok(())
    }

    /// Store one conflict classification per chunk, in order
    pub fn set_conflicts(&mut self, conflicts: impl IntoIterator<Item = ConflictType>) {
        for (chunk, conflict) in self.chunks.iter_mut().zip(conflicts) {
            chunk.set_conflict(conflict);
        }
    }

    /// Override the classification of one chunk; ranges and content stay as they are
    pub fn set_change_type(&mut self, index: usize, change_type: ChangeType) -> DiffResult<()> {
        self.chunk_mut(index)?.change_type = change_type;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of lines covered on the given side
    pub fn line_count(&self, side: ChangeSide) -> usize {
        self.chunks
            .last()
            .map(|chunk| chunk.range(side).end())
            .unwrap_or(0)
    }

    /// Reassemble the full text of one side
    pub fn text(&self, side: ChangeSide) -> String {
        self.chunks.iter().map(|chunk| chunk.text(side)).collect()
    }

    /// Check if any chunk has changes
    pub fn has_changes(&self) -> bool {
        self.chunks.iter().any(|c| c.has_changes())
    }

    /// Get the number of added lines
    pub fn added_lines(&self) -> usize {
        self.chunks.iter().map(|c| c.added_lines()).sum()
    }

    /// Get the number of deleted lines
    pub fn deleted_lines(&self) -> usize {
        self.chunks.iter().map(|c| c.deleted_lines()).sum()
    }

    /// Indices of the chunks an edit of the old-side range touches.
    ///
    /// A non-empty range touches every chunk it overlaps (half-open). An empty
    /// range is an insertion point and goes to exactly one chunk: the first one
    /// containing or starting at that line, or the last chunk when inserting at
    /// the very end.
    pub fn find_affected_chunks(&self, range: &LineRange) -> DiffResult<AffectedChunks> {
        let (start, end) = (range.start, range.end());

        let affected: AffectedChunks = if range.is_empty() {
            let owner = self
                .chunks
                .iter()
                .position(|c| c.old_range.start == start || c.old_range.contains(start))
                .or_else(|| {
                    (start == self.line_count(ChangeSide::Old) && !self.chunks.is_empty())
                        .then(|| self.chunks.len() - 1)
                });
            owner.into_iter().collect()
        } else {
            self.chunks
                .iter()
                .enumerate()
                .filter(|(_, c)| c.old_range.start < end && c.old_range.end() > start)
                .map(|(index, _)| index)
                .collect()
        };

        if affected.is_empty() {
            return Err(DiffError::invariant(format!(
                "edit of lines {}..{} matches no chunk (old side has {} lines)",
                start,
                end,
                self.line_count(ChangeSide::Old)
            )));
        }
        Ok(affected)
    }

    /// Shift every chunk from `from_index` on by `delta`
    pub fn propagate_additional_lines(&mut self, from_index: usize, delta: LineDelta) {
        if delta.is_zero() {
            return;
        }
        trace!("propagating {:?} from chunk {}", delta, from_index);
        for chunk in self.chunks.iter_mut().skip(from_index) {
            chunk.old_range = chunk.old_range.shifted(delta.old);
            chunk.new_range = chunk.new_range.shifted(delta.new);
        }
    }

    /// Apply an old-side edit to every chunk it touches.
    ///
    /// The sequence is only replaced once the result is known to be contiguous;
    /// on error it is left untouched. Returns the indices of the affected chunks.
    pub fn apply_edit(&mut self, edit: &LineEdit) -> DiffResult<AffectedChunks> {
        let affected = self.find_affected_chunks(&edit.old_range)?;
        self.apply_edit_to(&affected, edit)?;
        Ok(affected)
    }

    /// Apply an old-side edit to an explicit, ascending set of chunks
    pub fn apply_edit_to(&mut self, indices: &[usize], edit: &LineEdit) -> DiffResult<()> {
        let Some(&last) = indices.last() else {
            return Err(DiffError::invariant("edit applied to no chunk"));
        };
        if last >= self.chunks.len() {
            return Err(DiffError::ChunkOutOfRange {
                index: last,
                len: self.chunks.len(),
            });
        }

        let mut next = self.clone();
        for &index in indices {
            // Read from the untouched sequence so no chunk sees another's update
            next.chunks[index] = apply_change(edit, &self.chunks[index]);
        }
        next.propagate_additional_lines(last + 1, LineDelta::old_side(edit.line_delta()));
        next.validate()?;

        trace!(
            "applied edit of lines {:?} to chunks {:?}",
            edit.old_range.to_range(),
            indices
        );
        *self = next;
        Ok(())
    }

    /// Atomically replace the whole sequence, e.g. with a recomputed diff
    pub fn replace(&mut self, other: ChunkSequence) -> DiffResult<()> {
        other.validate()?;
        *self = other;
        Ok(())
    }
}

/// Produce the replacement for `chunk` after `edit` was applied to the old side.
///
/// Only the part of the chunk overlapping the edit is replaced. The chunk that
/// holds the start of the edit receives all of its new lines; a chunk starting
/// inside the edit only loses its overlapped lines and moves to the end of the
/// inserted content. The new side is never touched.
pub fn apply_change(edit: &LineEdit, chunk: &ChangeChunk) -> ChangeChunk {
    let (chunk_start, chunk_end) = (chunk.old_range.start, chunk.old_range.end());
    let (edit_start, edit_end) = (edit.old_range.start, edit.old_range.end());

    let cut_from = edit_start.clamp(chunk_start, chunk_end) - chunk_start;
    let cut_to = edit_end.clamp(chunk_start, chunk_end) - chunk_start;
    let owns_start = chunk_start <= edit_start;
    let inserted = if owns_start { edit.new_line_count() } else { 0 };

    let lines = split_lines(&chunk.old_text);
    let mut old_text = lines[..cut_from.min(lines.len())].concat();
    if owns_start {
        old_text.push_str(&edit.new_text);
    }
    old_text.push_str(&lines[cut_to.min(lines.len())..].concat());

    let start = if owns_start {
        chunk_start
    } else {
        edit_start + edit.new_line_count()
    };

    let mut updated = chunk.clone();
    updated.old_range = LineRange::new(start, chunk.old_range.count - (cut_to - cut_from) + inserted);
    if chunk.is_pending() {
        updated.change_type = ChangeType::classify(&old_text, &updated.new_text);
    }
    updated.old_text = old_text;
    updated
}
