//! Pairwise conflict classification between the chunks of the two merge sides.
//!
//! Both sides are diffed against the same base, so their old ranges live in
//! one coordinate space and can be compared directly.

use chunk_diff::{ChangeChunk, ChangeType, ConflictType, LineRange};

/// Whether two base regions collide.
///
/// Non-empty regions overlap half-open. An empty region is an insertion point
/// and collides with anything it touches, including a region ending or
/// starting exactly there.
pub fn regions_overlap(a: &LineRange, b: &LineRange) -> bool {
    if a.is_empty() || b.is_empty() {
        a.start <= b.end() && b.start <= a.end()
    } else {
        a.overlaps(b)
    }
}

/// Both chunks make the exact same change to the same base lines
fn is_same_change(chunk: &ChangeChunk, opposing: &ChangeChunk) -> bool {
    chunk.old_range == opposing.old_range && chunk.new_text == opposing.new_text
}

/// Classify one chunk against one chunk of the other side
pub fn classify_pair(chunk: &ChangeChunk, opposing: &ChangeChunk) -> ConflictType {
    if chunk.change_type == ChangeType::Same
        || opposing.change_type == ChangeType::Same
        || !regions_overlap(&chunk.old_range, &opposing.old_range)
        || is_same_change(chunk, opposing)
    {
        ConflictType::NonConflicting
    } else if !chunk.is_pending() || !opposing.is_pending() {
        ConflictType::Resolved
    } else {
        ConflictType::Conflicting
    }
}

/// The classification that needs the most attention: `Conflicting` over
/// `Resolved` over `NonConflicting`
pub fn most_severe(a: ConflictType, b: ConflictType) -> ConflictType {
    match (a, b) {
        (ConflictType::Conflicting, _) | (_, ConflictType::Conflicting) => ConflictType::Conflicting,
        (ConflictType::Resolved, _) | (_, ConflictType::Resolved) => ConflictType::Resolved,
        _ => ConflictType::NonConflicting,
    }
}

/// Classify one chunk against every chunk of the other side
pub fn classify_chunk(chunk: &ChangeChunk, opposing: &[ChangeChunk]) -> ConflictType {
    if chunk.change_type == ChangeType::Same {
        return ConflictType::NonConflicting;
    }
    opposing
        .iter()
        .map(|other| classify_pair(chunk, other))
        .fold(ConflictType::NonConflicting, most_severe)
}

/// Classify every chunk of one side, in order
pub fn classify_all(chunks: &[ChangeChunk], opposing: &[ChangeChunk]) -> Vec<ConflictType> {
    chunks
        .iter()
        .map(|chunk| classify_chunk(chunk, opposing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunk_diff::ChunkStatus;
    use pretty_assertions::assert_eq;

    fn chunk(start: usize, count: usize, new_text: &str) -> ChangeChunk {
        let old_text: String = (start..start + count).map(|i| format!("l{}\n", i)).collect();
        let mut chunk = ChangeChunk::from_content(
            LineRange::new(start, count),
            LineRange::new(start, chunk_diff::line_count(new_text)),
            old_text,
            new_text,
        );
        chunk.set_status(ChunkStatus::Pending);
        chunk
    }

    #[test]
    fn test_regions_overlap() {
        let r = LineRange::new;
        assert!(regions_overlap(&r(2, 3), &r(4, 2)));
        assert!(!regions_overlap(&r(2, 3), &r(5, 2)));
        // Insertion points touch their neighbours
        assert!(regions_overlap(&r(5, 0), &r(2, 3)));
        assert!(regions_overlap(&r(2, 0), &r(2, 3)));
        assert!(regions_overlap(&r(2, 0), &r(2, 0)));
        assert!(!regions_overlap(&r(6, 0), &r(2, 3)));
    }

    #[test]
    fn test_overlapping_pending_changes_conflict() {
        let yours = chunk(1, 1, "B\n");
        let theirs = chunk(1, 1, "B2\n");
        assert_eq!(classify_pair(&yours, &theirs), ConflictType::Conflicting);
    }

    #[test]
    fn test_identical_changes_do_not_conflict() {
        let yours = chunk(1, 1, "B\n");
        let theirs = chunk(1, 1, "B\n");
        assert_eq!(classify_pair(&yours, &theirs), ConflictType::NonConflicting);
    }

    #[test]
    fn test_decided_chunk_resolves_conflict() {
        let yours = chunk(1, 2, "x\n");
        let mut theirs = chunk(2, 1, "y\n");
        theirs.set_status(ChunkStatus::Discarded);
        assert_eq!(classify_pair(&yours, &theirs), ConflictType::Resolved);
    }

    #[test]
    fn test_classify_chunk_priority() {
        let yours = chunk(2, 3, "x\n");
        let mut decided = chunk(2, 1, "y\n");
        decided.set_status(ChunkStatus::Accepted);
        let pending = chunk(4, 1, "z\n");
        let far = chunk(9, 1, "w\n");

        assert_eq!(
            classify_chunk(&yours, &[far.clone()]),
            ConflictType::NonConflicting
        );
        assert_eq!(
            classify_chunk(&yours, &[decided.clone(), far.clone()]),
            ConflictType::Resolved
        );
        assert_eq!(
            classify_chunk(&yours, &[decided, pending, far]),
            ConflictType::Conflicting
        );
    }

    #[test]
    fn test_most_severe_is_symmetric() {
        use ConflictType::*;
        for (a, b, expected) in [
            (NonConflicting, NonConflicting, NonConflicting),
            (NonConflicting, Resolved, Resolved),
            (Resolved, Conflicting, Conflicting),
            (NonConflicting, Conflicting, Conflicting),
        ] {
            assert_eq!(most_severe(a, b), expected);
            assert_eq!(most_severe(b, a), expected);
        }
    }

    #[test]
    fn test_unchanged_chunk_never_conflicts() {
        let same = ChangeChunk::from_content(LineRange::new(0, 3), LineRange::new(0, 3), "a\nb\nc\n", "a\nb\nc\n");
        let theirs = chunk(1, 1, "B\n");
        assert_eq!(classify_chunk(&same, &[theirs]), ConflictType::NonConflicting);
    }
}
