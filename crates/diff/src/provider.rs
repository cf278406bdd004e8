use similar::{Algorithm, DiffTag};
use std::time::{Duration, Instant};

use crate::comparator::TextComparator;
use crate::edit::{split_lines, Edit};

/// Computes the raw line edits between two texts.
///
/// Implementations must return non-overlapping edits in ascending order; lines
/// between edits are unchanged.
pub trait LineDiffProvider {
    fn diff_lines(&self, old_text: &str, new_text: &str, comparator: TextComparator) -> Vec<Edit>;
}

/// Line diffing backed by the `similar` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarDiffProvider {
    pub algorithm: Algorithm,
    pub timeout: Option<Duration>,
}

impl Default for SimilarDiffProvider {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl LineDiffProvider for SimilarDiffProvider {
    fn diff_lines(&self, old_text: &str, new_text: &str, comparator: TextComparator) -> Vec<Edit> {
        let old_keys: Vec<_> = split_lines(old_text)
            .into_iter()
            .map(|line| comparator.normalize(line))
            .collect();
        let new_keys: Vec<_> = split_lines(new_text)
            .into_iter()
            .map(|line| comparator.normalize(line))
            .collect();

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let ops = similar::capture_diff_slices_deadline(self.algorithm, &old_keys, &new_keys, deadline);

        let mut edits: Vec<Edit> = Vec::new();
        for op in ops {
            let (tag, old, new) = op.as_tag_tuple();
            if tag == DiffTag::Equal {
                continue;
            }
            // Deletes and inserts that touch become a single modification
            match edits.last_mut() {
                Some(last) if last.old_end == old.start && last.new_end == new.start => {
                    last.old_end = old.end;
                    last.new_end = new.end;
                }
                _ => edits.push(Edit::new(old.start, old.end, new.start, new.end)),
            }
        }
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_replacement() {
        let edits = SimilarDiffProvider::default().diff_lines("a\nb\nc\n", "a\nB\nc\n", TextComparator::Default);
        assert_eq!(edits, vec![Edit::new(1, 2, 1, 2)]);
    }

    #[test]
    fn test_insert_and_delete() {
        let edits = SimilarDiffProvider::default().diff_lines("a\nb\nc\n", "a\nc\nd\n", TextComparator::Default);
        assert_eq!(edits, vec![Edit::new(1, 2, 1, 1), Edit::new(3, 3, 2, 3)]);
    }

    #[test]
    fn test_whitespace_comparator_hides_changes() {
        let provider = SimilarDiffProvider::default();
        let old = "fn main() {\n    run();\n}\n";
        let new = "fn main() {\n  run();  \n}\n";
        assert_eq!(provider.diff_lines(old, new, TextComparator::Default).len(), 1);
        assert!(provider.diff_lines(old, new, TextComparator::IgnoreAll).is_empty());
        assert!(provider.diff_lines(old, new, TextComparator::IgnoreChange).is_empty());
    }

    #[test]
    fn test_identical_texts() {
        let edits = SimilarDiffProvider::default().diff_lines("x\ny\n", "x\ny\n", TextComparator::Default);
        assert!(edits.is_empty());
    }
}
