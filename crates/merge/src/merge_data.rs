use std::cmp::Reverse;

use chunk_diff::{
    AffectedChunks, ChangeChunk, ChangeSide, ChangeType, ChunkSequence, ChunkStatus, ConflictType, DiffConfig,
    DiffError, FileDiff, FileHeader, LineEdit, LineRange,
};
use derive_more::Display;
use log::{debug, warn};
use ropey::Rope;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::conflict::{classify_pair, most_severe};
use crate::error::{MergeError, MergeResult};
use crate::line_ending::{adjust_line_endings, LineEnding};

/// One of the two texts being merged into the fork point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConflictSide {
    #[display(fmt = "yours")]
    Yours,

    #[display(fmt = "theirs")]
    Theirs,
}

impl ConflictSide {
    pub fn opposite(&self) -> Self {
        match self {
            ConflictSide::Yours => ConflictSide::Theirs,
            ConflictSide::Theirs => ConflictSide::Yours,
        }
    }
}

/// A three-way merge in progress.
///
/// Holds the base buffer being resolved and one diff per side against it. The
/// old side of both diffs always reads exactly like the base buffer; every
/// accepted change is written into the buffer and re-anchors both diffs.
#[derive(Debug, Clone)]
pub struct MergeData {
    /// The text being resolved, starting out as the fork point
    base: Rope,

    /// The fork-point text as it was when the merge started
    original_base: String,

    yours: FileDiff,
    theirs: FileDiff,

    /// Chunks as they were when the merge started, for resets
    pristine_yours: ChunkSequence,
    pristine_theirs: ChunkSequence,
}

impl MergeData {
    /// Start a merge from two diffs against the same fork point.
    ///
    /// Every change of either diff ends up between two `Same` chunks; empty ones
    /// are added at the ends of the text and between touching changes, so chunk
    /// indices may differ from the diffs passed in.
    pub fn new(mut yours: FileDiff, mut theirs: FileDiff) -> MergeResult<Self> {
        let base_text = yours.text_on_side(ChangeSide::Old);
        if base_text != theirs.text_on_side(ChangeSide::Old) {
            return Err(MergeError::BaseMismatch);
        }

        let framed = frame_changes(yours.sequence())?;
        yours.sequence_mut().replace(framed)?;
        let framed = frame_changes(theirs.sequence())?;
        theirs.sequence_mut().replace(framed)?;

        yours.sequence_mut().set_all_status(ChunkStatus::Pending);
        theirs.sequence_mut().set_all_status(ChunkStatus::Pending);

        let mut merge = Self {
            base: Rope::from_str(&base_text),
            original_base: base_text,
            pristine_yours: yours.sequence().clone(),
            pristine_theirs: theirs.sequence().clone(),
            yours,
            theirs,
        };
        merge.mark_conflicting();
        debug!(
            "merge started with {} chunks on yours and {} on theirs",
            merge.yours.change_chunks().len(),
            merge.theirs.change_chunks().len()
        );
        Ok(merge)
    }

    /// Diff both sides against `base` and start a merge
    pub fn from_texts(base: &str, yours: &str, theirs: &str, config: &DiffConfig) -> MergeResult<Self> {
        let yours = FileDiff::new(FileHeader::default(), base, yours, config)?;
        let theirs = FileDiff::new(FileHeader::default(), base, theirs, config)?;
        Self::new(yours, theirs)
    }

    /// The diff of one side against the current base
    pub fn diff(&self, side: ConflictSide) -> &FileDiff {
        match side {
            ConflictSide::Yours => &self.yours,
            ConflictSide::Theirs => &self.theirs,
        }
    }

    fn diff_mut(&mut self, side: ConflictSide) -> &mut FileDiff {
        match side {
            ConflictSide::Yours => &mut self.yours,
            ConflictSide::Theirs => &mut self.theirs,
        }
    }

    fn pristine(&self, side: ConflictSide) -> &ChunkSequence {
        match side {
            ConflictSide::Yours => &self.pristine_yours,
            ConflictSide::Theirs => &self.pristine_theirs,
        }
    }

    /// The current content of the base buffer
    pub fn base_text(&self) -> String {
        self.base.to_string()
    }

    /// The fork-point text the merge started from
    pub fn original_base(&self) -> &str {
        &self.original_base
    }

    /// Current classification of a chunk
    pub fn conflict(&self, side: ConflictSide, index: usize) -> MergeResult<ConflictType> {
        let chunk = self.diff(side).chunk(index)?;
        Ok(chunk.conflict().unwrap_or(ConflictType::NonConflicting))
    }

    /// Recompute the conflict classification of every chunk on both sides
    pub fn mark_conflicting(&mut self) {
        for side in [ConflictSide::Yours, ConflictSide::Theirs] {
            let conflicts: Vec<ConflictType> = self
                .diff(side)
                .change_chunks()
                .iter()
                .enumerate()
                .map(|(index, chunk)| self.classify_with(side, index, chunk))
                .collect();
            self.diff_mut(side).sequence_mut().set_conflicts(conflicts);
        }
    }

    /// Whether the base region of a pending change was rewritten by hand.
    ///
    /// Nothing but a manual edit moves a pending change away from the base
    /// content it was diffed against.
    pub fn is_hand_edited(&self, side: ConflictSide, index: usize) -> bool {
        let Some(chunk) = self.diff(side).change_chunks().get(index) else {
            return false;
        };
        chunk.is_pending()
            && chunk.has_changes()
            && self
                .pristine(side)
                .get(index)
                .is_some_and(|pristine| pristine.old_text != chunk.old_text)
    }

    fn classify(&self, side: ConflictSide, index: usize) -> MergeResult<ConflictType> {
        let chunk = self.diff(side).chunk(index)?;
        Ok(self.classify_with(side, index, chunk))
    }

    /// Classify a chunk against the other side; a collision the user already
    /// rewrote by hand counts as resolved
    fn classify_with(&self, side: ConflictSide, index: usize, chunk: &ChangeChunk) -> ConflictType {
        let opposing = side.opposite();
        let own_edit = self.is_hand_edited(side, index);
        self.diff(opposing)
            .change_chunks()
            .iter()
            .enumerate()
            .map(|(other_index, other)| match classify_pair(chunk, other) {
                ConflictType::Conflicting if own_edit || self.is_hand_edited(opposing, other_index) => {
                    ConflictType::Resolved
                }
                pair => pair,
            })
            .fold(ConflictType::NonConflicting, most_severe)
    }

    /// Whether any undecided change still collides with the other side
    pub fn has_conflicts(&self) -> bool {
        [&self.yours, &self.theirs].iter().any(|diff| {
            diff.change_chunks()
                .iter()
                .any(|chunk| chunk.is_pending() && chunk.conflict() == Some(ConflictType::Conflicting))
        })
    }

    /// Write the change of one chunk into the base.
    ///
    /// Only pending chunks with changes can be accepted; anything else is left
    /// as is. A chunk that collides with an undecided change of the other side
    /// is rejected until that change is discarded or accepted.
    pub fn accept_chunk(&mut self, side: ConflictSide, index: usize) -> MergeResult<()> {
        let chunk = self.diff(side).chunk(index)?.clone();
        if !chunk.is_pending() || chunk.change_type == ChangeType::Same {
            debug!("chunk {} of {} has nothing to accept", index, side);
            return Ok(());
        }
        let opposing = side.opposite();
        if self.classify(side, index)? == ConflictType::Conflicting {
            return Err(MergeError::UnresolvedConflictWrite { side, index });
        }

        let edit = LineEdit::new(chunk.old_range, chunk.old_text.clone(), chunk.new_text.clone());

        let mut own = self.diff(side).clone();
        let seq = own.sequence_mut();
        seq.apply_edit_to(&[index], &edit)?;
        seq.set_change_type(index, chunk.change_type)?;
        seq.set_status(index, ChunkStatus::Accepted)?;

        // The other side made the very same change: it is accepted along with this one
        let identical: Vec<usize> = self
            .diff(opposing)
            .change_chunks()
            .iter()
            .enumerate()
            .filter(|(_, other)| {
                other.is_pending()
                    && other.has_changes()
                    && other.old_range == chunk.old_range
                    && other.new_text == chunk.new_text
            })
            .map(|(i, _)| i)
            .collect();
        let (mut other, _) = reanchor(self.diff(opposing), &edit)?;
        for i in identical {
            other.sequence_mut().set_status(i, ChunkStatus::Accepted)?;
        }

        let base = splice_base(&self.base, &edit)?;
        debug!(
            "accepted chunk {} of {} at base lines {:?}",
            index,
            side,
            chunk.old_range.to_range()
        );
        self.commit(side, own, other, base);
        Ok(())
    }

    /// Decline the change of one chunk; the base is not touched
    pub fn discard_change(&mut self, side: ConflictSide, index: usize) -> MergeResult<()> {
        let chunk = self.diff(side).chunk(index)?;
        match chunk.status() {
            Some(ChunkStatus::Discarded) => {}
            Some(ChunkStatus::Accepted) => {
                warn!(
                    "chunk {} of {} was already accepted, reset it before discarding",
                    index, side
                );
            }
            None | Some(ChunkStatus::Pending) => {
                self.diff_mut(side)
                    .sequence_mut()
                    .set_status(index, ChunkStatus::Discarded)?;
                debug!("discarded chunk {} of {}", index, side);
                self.mark_conflicting();
            }
        }
        Ok(())
    }

    /// Undo the decision taken on one chunk.
    ///
    /// The base region of the chunk gets its fork-point content back; lines
    /// around it are left alone. Chunks of the other side touched by the
    /// restored region return to pending if they had been accepted.
    pub fn reset_chunk(&mut self, side: ConflictSide, index: usize) -> MergeResult<()> {
        let pristine = self.pristine(side).chunk(index)?.clone();
        let current = self.diff(side).chunk(index)?.clone();
        let restores_text = current.old_text != pristine.old_text;
        if current.is_pending() && !restores_text {
            return Ok(());
        }

        let edit = LineEdit::new(current.old_range, current.old_text, pristine.old_text);
        let opposing = side.opposite();

        let mut own = self.diff(side).clone();
        let seq = own.sequence_mut();
        if restores_text {
            seq.apply_edit_to(&[index], &edit)?;
        }
        seq.set_change_type(index, pristine.change_type)?;
        seq.set_status(index, ChunkStatus::Pending)?;

        let (other, base) = if restores_text {
            let (mut other, touched) = reanchor(self.diff(opposing), &edit)?;
            for i in touched {
                if other.chunk(i)?.status() == Some(ChunkStatus::Accepted) {
                    other.sequence_mut().set_status(i, ChunkStatus::Pending)?;
                }
            }
            (other, splice_base(&self.base, &edit)?)
        } else {
            (self.diff(opposing).clone(), self.base.clone())
        };

        debug!("reset chunk {} of {}", index, side);
        self.commit(side, own, other, base);
        Ok(())
    }

    /// Put the whole merge back to the state it started in
    pub fn reset(&mut self) -> MergeResult<()> {
        let mut yours = self.yours.clone();
        let mut theirs = self.theirs.clone();
        yours.sequence_mut().replace(self.pristine_yours.clone())?;
        theirs.sequence_mut().replace(self.pristine_theirs.clone())?;

        self.yours = yours;
        self.theirs = theirs;
        self.base = Rope::from_str(&self.original_base);
        self.mark_conflicting();
        debug!("merge reset");
        Ok(())
    }

    /// Edit the base text directly.
    ///
    /// With `is_insert` the `text` is inserted at the character `offset`;
    /// otherwise `length` characters are removed there. The edit belongs to
    /// neither side: whole lines typed on a change boundary stay outside the
    /// change, and a conflict whose region is rewritten counts as resolved.
    pub fn insert_text(&mut self, text: &str, length: usize, offset: usize, is_insert: bool) -> MergeResult<()> {
        let (inserted, removed) = if is_insert { (text, 0) } else { ("", length) };

        let edit = LineEdit::from_text_change(&self.base, offset, inserted, removed)?;
        let (yours, _) = reanchor(&self.yours, &edit)?;
        let (theirs, _) = reanchor(&self.theirs, &edit)?;

        let mut base = self.base.clone();
        base.try_remove(offset..offset + removed)
            .map_err(|e| MergeError::Buffer(e.to_string()))?;
        base.try_insert(offset, inserted)
            .map_err(|e| MergeError::Buffer(e.to_string()))?;

        debug!(
            "manual base edit at {} (+{} chars, -{} chars)",
            offset,
            inserted.chars().count(),
            removed
        );
        self.yours = yours;
        self.theirs = theirs;
        self.base = base;
        self.mark_conflicting();
        Ok(())
    }

    /// Accept every pending change of one side that does not conflict.
    ///
    /// Chunks are taken from the bottom of the base up so an accepted chunk
    /// never moves one that is still to be processed. Changes whose region was
    /// rewritten by hand are left as the user wrote them. Returns how many
    /// chunks were accepted.
    pub fn accept_non_conflicting(&mut self, side: ConflictSide) -> MergeResult<usize> {
        let mut next = self.clone();
        let count = next.accept_non_conflicting_in_place(side)?;
        *self = next;
        Ok(count)
    }

    fn accept_non_conflicting_in_place(&mut self, side: ConflictSide) -> MergeResult<usize> {
        let mut order: Vec<(usize, usize)> = self
            .diff(side)
            .change_chunks()
            .iter()
            .enumerate()
            .filter(|(index, chunk)| is_acceptable(chunk) && !self.is_hand_edited(side, *index))
            .map(|(index, chunk)| (chunk.old_range.start, index))
            .collect();
        order.sort_by_key(|&key| Reverse(key));

        let mut accepted = 0;
        for (_, index) in order {
            if !is_acceptable(self.diff(side).chunk(index)?)
                || self.is_hand_edited(side, index)
                || self.classify(side, index)? == ConflictType::Conflicting
            {
                continue;
            }
            self.accept_chunk(side, index)?;
            accepted += 1;
        }
        debug!("accepted {} non-conflicting chunks of {}", accepted, side);
        Ok(accepted)
    }

    /// Accept every non-conflicting change of both sides, yours first
    pub fn accept_all_non_conflicting(&mut self) -> MergeResult<usize> {
        let mut next = self.clone();
        let count = next.accept_non_conflicting_in_place(ConflictSide::Yours)?
            + next.accept_non_conflicting_in_place(ConflictSide::Theirs)?;
        *self = next;
        Ok(count)
    }

    /// Resolve the merge without user input if nothing conflicts.
    ///
    /// Returns the resolved text, or `None` when a conflict needs a decision.
    pub fn try_auto_resolve(&mut self) -> MergeResult<Option<String>> {
        if self.has_conflicts() {
            return Ok(None);
        }
        self.accept_all_non_conflicting()?;
        Ok(Some(self.resolved_text()))
    }

    /// Line ending of the resolved text: the one both sides agree on, else the platform's
    pub fn line_ending(&self) -> LineEnding {
        let yours = LineEnding::detect(&self.yours.text_on_side(ChangeSide::New));
        let theirs = LineEnding::detect(&self.theirs.text_on_side(ChangeSide::New));
        match (yours, theirs) {
            (Some(yours), Some(theirs)) if yours == theirs => yours,
            _ => LineEnding::platform(),
        }
    }

    /// The base text with its line endings normalized, ready to be written out
    pub fn resolved_text(&self) -> String {
        adjust_line_endings(&self.base_text(), self.line_ending())
    }

    fn commit(&mut self, side: ConflictSide, own: FileDiff, other: FileDiff, base: Rope) {
        *self.diff_mut(side) = own;
        *self.diff_mut(side.opposite()) = other;
        self.base = base;
        self.mark_conflicting();
    }
}

/// A pending chunk that still has a change to write
fn is_acceptable(chunk: &ChangeChunk) -> bool {
    chunk.is_pending() && chunk.has_changes()
}

/// Apply a base edit to the diff of a side that did not make it.
///
/// The touched chunks keep their change type: they still describe that side's
/// change against the fork point.
fn reanchor(diff: &FileDiff, edit: &LineEdit) -> MergeResult<(FileDiff, AffectedChunks)> {
    let mut diff = diff.clone();
    let affected = landing_chunks(&diff, edit)?;
    let types: Vec<ChangeType> = diff.change_chunks().iter().map(|c| c.change_type).collect();

    let seq = diff.sequence_mut();
    seq.apply_edit_to(&affected, edit)?;
    for &index in &affected {
        seq.set_change_type(index, types[index])?;
    }
    Ok((diff, affected))
}

/// Chunks of `diff` a base edit lands in.
///
/// A pure insertion on a chunk boundary goes to an adjacent `Same` chunk, so
/// lines that are not part of a side's change never become its old content.
/// Only an insertion strictly inside a change lands in that change.
fn landing_chunks(diff: &FileDiff, edit: &LineEdit) -> MergeResult<AffectedChunks> {
    if edit.old_range.is_empty() {
        let line = edit.old_range.start;
        let unchanged = diff.change_chunks().iter().position(|chunk| {
            !chunk.has_changes() && chunk.old_range.start <= line && line <= chunk.old_range.end()
        });
        if let Some(index) = unchanged {
            return Ok(std::iter::once(index).collect());
        }
    }
    Ok(diff.sequence().find_affected_chunks(&edit.old_range)?)
}

/// Surround every change with `Same` chunks.
///
/// Empty ones are added where a change starts or ends the text or touches
/// another change, so every line boundary next to a change has an unchanged
/// chunk that can take lines inserted there.
fn frame_changes(sequence: &ChunkSequence) -> MergeResult<ChunkSequence> {
    let empty_same = |old_line: usize, new_line: usize| {
        ChangeChunk::new(
            ChangeType::Same,
            LineRange::new(old_line, 0),
            LineRange::new(new_line, 0),
            "",
            "",
        )
    };

    let mut chunks: Vec<ChangeChunk> = Vec::with_capacity(sequence.len() + 2);
    for chunk in sequence.chunks() {
        if chunk.has_changes() && chunks.last().map_or(true, |prev| prev.has_changes()) {
            chunks.push(empty_same(chunk.old_range.start, chunk.new_range.start));
        }
        chunks.push(chunk.clone());
    }
    let tail = chunks
        .last()
        .filter(|last| last.has_changes())
        .map(|last| empty_same(last.old_range.end(), last.new_range.end()));
    chunks.extend(tail);

    Ok(ChunkSequence::from_chunks(chunks)?)
}

/// Replace the lines of `edit` in a copy of the base buffer
fn splice_base(base: &Rope, edit: &LineEdit) -> MergeResult<Rope> {
    let line_start = |line: usize| {
        base.try_line_to_char(line)
            .map_err(|_| out_of_base(&edit.old_range, base))
    };
    let start = line_start(edit.old_range.start)?;
    let end = line_start(edit.old_range.end())?;

    let mut base = base.clone();
    base.try_remove(start..end)
        .map_err(|e| MergeError::Buffer(e.to_string()))?;
    base.try_insert(start, &edit.new_text)
        .map_err(|e| MergeError::Buffer(e.to_string()))?;
    Ok(base)
}

fn out_of_base(range: &LineRange, base: &Rope) -> MergeError {
    MergeError::Diff(DiffError::InvariantViolation(format!(
        "lines {:?} are outside of a base of {} lines",
        range.to_range(),
        base.len_lines()
    )))
}
