use chunk_diff::{
    apply_change, ChangeChunk, ChangeSide, ChangeType, ChunkSequence, DiffError, Edit, LineDelta, LineEdit, LineRange,
};
use pretty_assertions::assert_eq;

const STARTS: [usize; 7] = [0, 5, 7, 15, 22, 28, 46];
const ENDS: [usize; 7] = [5, 7, 15, 22, 28, 46, 54];

/// Line `i` of the test text
fn line(i: usize) -> String {
    format!("l{}\n", i)
}

fn lines(range: std::ops::Range<usize>) -> String {
    range.map(line).collect()
}

/// Chunks with the given boundaries, whose content is `l0`, `l1`, ...
fn sequence(starts: &[usize], ends: &[usize]) -> ChunkSequence {
    let chunks = starts
        .iter()
        .zip(ends)
        .map(|(&start, &end)| {
            let range = LineRange::from_range(start..end);
            ChangeChunk::new(ChangeType::Same, range, range, lines(start..end), lines(start..end))
        })
        .collect();
    ChunkSequence::from_chunks(chunks).unwrap()
}

fn affected(seq: &ChunkSequence, start: usize, end: usize) -> Vec<usize> {
    seq.find_affected_chunks(&LineRange::from_range(start..end))
        .unwrap()
        .to_vec()
}

#[test]
fn test_affected_chunks_several() {
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 4, 9), vec![0, 1, 2]);
}

#[test]
fn test_affected_chunks_exactly_one() {
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 5, 7), vec![1]);
}

#[test]
fn test_affected_chunks_insert_one_line() {
    // Inserting on a chunk boundary goes to the chunk starting there
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 5, 5), vec![1]);
}

#[test]
fn test_affected_chunks_part_of_one() {
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 8, 10), vec![2]);
    assert_eq!(affected(&seq, 5, 6), vec![1]);
}

#[test]
fn test_affected_chunks_insert_before_empty_chunk() {
    // The empty chunk at line 4 starts at the insertion point and wins
    let seq = sequence(&[0, 4, 4, 8], &[4, 4, 8, 12]);
    assert_eq!(affected(&seq, 4, 4), vec![1]);
}

#[test]
fn test_affected_chunks_boundary_end_is_exclusive() {
    // A range ending where a chunk starts does not touch that chunk
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 3, 5), vec![0]);
    assert_eq!(affected(&seq, 7, 15), vec![2]);
}

#[test]
fn test_affected_chunks_insert_at_end_of_text() {
    let seq = sequence(&STARTS, &ENDS);
    assert_eq!(affected(&seq, 54, 54), vec![6]);
}

#[test]
fn test_affected_chunks_outside_of_text() {
    let seq = sequence(&STARTS, &ENDS);
    let err = seq
        .find_affected_chunks(&LineRange::from_range(60..62))
        .unwrap_err();
    assert!(matches!(err, DiffError::InvariantViolation(_)));
    assert!(seq.find_affected_chunks(&LineRange::new(60, 0)).is_err());
}

fn assert_propagated(delta: isize) {
    let from = 2;
    let mut seq = sequence(&STARTS, &ENDS);
    seq.propagate_additional_lines(from, LineDelta::uniform(delta));

    for (index, chunk) in seq.chunks().iter().enumerate() {
        let shift = if index >= from { delta } else { 0 };
        let start = (STARTS[index] as isize + shift) as usize;
        let end = (ENDS[index] as isize + shift) as usize;
        assert_eq!(chunk.old_range.to_range(), start..end);
        assert_eq!(chunk.new_range.to_range(), start..end);
    }
}

#[test]
fn test_propagate_additional_lines_positive() {
    assert_propagated(5);
}

#[test]
fn test_propagate_additional_lines_negative() {
    assert_propagated(-5);
}

#[test]
fn test_propagate_additional_lines_neutral() {
    assert_propagated(0);
}

#[test]
fn test_propagate_old_side_only() {
    let mut seq = sequence(&STARTS, &ENDS);
    seq.propagate_additional_lines(3, LineDelta::old_side(2));
    assert_eq!(seq.chunks()[3].old_range.start, 17);
    assert_eq!(seq.chunks()[3].new_range.start, 15);
}

/// Apply `new_text` over old lines `start..end` and compare with the plain text edit
fn assert_round_trip(start: usize, end: usize, new_text: &str) {
    let mut seq = sequence(&STARTS, &ENDS);
    let edit = LineEdit::new(LineRange::from_range(start..end), lines(start..end), new_text);
    seq.apply_edit(&edit).unwrap();

    let expected = format!("{}{}{}", lines(0..start), new_text, lines(end..54));
    assert_eq!(seq.text(ChangeSide::Old), expected);
    assert_eq!(
        seq.line_count(ChangeSide::Old) as isize,
        54 + edit.line_delta()
    );
    // The new side is never touched by an old-side edit
    assert_eq!(seq.text(ChangeSide::New), lines(0..54));
    assert_eq!(seq.line_count(ChangeSide::New), 54);
    seq.validate().unwrap();
}

#[test]
fn test_apply_changes_replace_more() {
    assert_round_trip(4, 11, "ax\nax\nax\nax\nax\nax\nax\nax\n");
}

#[test]
fn test_apply_changes_replace_less() {
    assert_round_trip(4, 11, "ax\nax\nax\nax\nax\n");
}

#[test]
fn test_apply_changes_replace_less_one_chunk() {
    assert_round_trip(7, 11, "ax\nax\n");
}

#[test]
fn test_apply_changes_replace_line() {
    assert_round_trip(4, 5, "ax\n");
}

#[test]
fn test_apply_changes_insert() {
    assert_round_trip(10, 10, "ax\nax\nax\nax\nax\n");
}

#[test]
fn test_apply_changes_insert_at_boundary() {
    assert_round_trip(15, 15, "ax\n");
}

#[test]
fn test_apply_changes_delete() {
    assert_round_trip(4, 11, "");
}

#[test]
fn test_apply_changes_delete_whole_chunks() {
    assert_round_trip(5, 22, "");
}

#[test]
fn test_apply_edit_ranges() {
    // Replacing lines 4..11 with 8 lines: chunk 0 takes the content, chunk 1 is swallowed
    let mut seq = sequence(&STARTS, &ENDS);
    let edit = LineEdit::new(LineRange::from_range(4..11), lines(4..11), lines(100..108));
    let affected = seq.apply_edit(&edit).unwrap();

    assert_eq!(affected.to_vec(), vec![0, 1, 2]);
    let ranges: Vec<_> = seq.chunks().iter().map(|c| c.old_range.to_range()).collect();
    assert_eq!(
        ranges,
        vec![0..12, 12..12, 12..16, 16..23, 23..29, 29..47, 47..55]
    );
    assert_eq!(seq.chunks()[0].change_type, ChangeType::Modify);
    assert_eq!(seq.chunks()[1].change_type, ChangeType::Add);
    assert_eq!(seq.chunks()[3].change_type, ChangeType::Same);
}

#[test]
fn test_apply_change_keeps_untouched_content() {
    let seq = sequence(&STARTS, &ENDS);
    let edit = LineEdit::new(LineRange::from_range(8..10), lines(8..10), "x\n");
    let chunk = apply_change(&edit, &seq.chunks()[2]);

    assert_eq!(chunk.old_range, LineRange::new(7, 7));
    assert_eq!(chunk.old_text, format!("{}x\n{}", lines(7..8), lines(10..15)));
    assert_eq!(chunk.new_range, seq.chunks()[2].new_range);
}

#[test]
fn test_apply_change_is_order_independent() {
    // Every affected chunk is derived from the untouched sequence
    let seq = sequence(&STARTS, &ENDS);
    let edit = LineEdit::new(LineRange::from_range(4..9), lines(4..9), "y\n");
    let forward: Vec<_> = [0, 1, 2].iter().map(|&i| apply_change(&edit, &seq.chunks()[i])).collect();
    let mut backward: Vec<_> = [2, 1, 0].iter().map(|&i| apply_change(&edit, &seq.chunks()[i])).collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn test_failed_edit_leaves_sequence_untouched() {
    let mut seq = sequence(&STARTS, &ENDS);
    let before = seq.clone();
    let edit = LineEdit::new(LineRange::from_range(60..61), "", "x\n");
    assert!(seq.apply_edit(&edit).is_err());
    assert_eq!(seq, before);
}

#[test]
fn test_from_edits_fills_gaps() {
    let old = "a\nb\nc\nd\n";
    let new = "a\nB\nc\nd\ne\n";
    let seq = ChunkSequence::from_edits(old, new, &[Edit::new(1, 2, 1, 2), Edit::new(4, 4, 4, 5)]).unwrap();

    let types: Vec<_> = seq.chunks().iter().map(|c| c.change_type).collect();
    insta::assert_debug_snapshot!(types, @r###"
    [
        Same,
        Modify,
        Same,
        Add,
    ]
    "###);
    assert_eq!(seq.text(ChangeSide::Old), old);
    assert_eq!(seq.text(ChangeSide::New), new);
    assert_eq!(seq.chunks()[3].old_range, LineRange::new(4, 0));
}

#[test]
fn test_from_edits_rejects_bad_edits() {
    let old = "a\nb\nc\n";
    // Out of order
    assert!(ChunkSequence::from_edits(old, old, &[Edit::new(2, 3, 2, 3), Edit::new(0, 1, 0, 1)]).is_err());
    // Past the end of the text
    assert!(ChunkSequence::from_edits(old, old, &[Edit::new(2, 5, 2, 3)]).is_err());
    // Unchanged gap of different length on each side
    assert!(ChunkSequence::from_edits(old, "a\nb\nc\n", &[Edit::new(1, 2, 2, 3)]).is_err());
}

#[test]
fn test_from_chunks_rejects_gaps() {
    let chunks = vec![
        ChangeChunk::from_content(LineRange::new(0, 1), LineRange::new(0, 1), "a\n", "a\n"),
        ChangeChunk::from_content(LineRange::new(2, 1), LineRange::new(1, 1), "b\n", "b\n"),
    ];
    assert!(matches!(
        ChunkSequence::from_chunks(chunks),
        Err(DiffError::InvariantViolation(_))
    ));
}
