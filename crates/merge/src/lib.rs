// Three-way merge on top of chunk diffs
// Two diffs against a common fork point are resolved chunk by chunk into one text.

mod conflict;
mod error;
mod line_ending;
mod merge_data;

pub use conflict::{classify_all, classify_chunk, classify_pair, most_severe, regions_overlap};
pub use error::{MergeError, MergeResult};
pub use line_ending::{adjust_line_endings, LineEnding};
pub use merge_data::{ConflictSide, MergeData};

// Re-export the diff model so callers need only one dependency
pub use chunk_diff::{
    line_count, split_lines, ChangeChunk, ChangeSide, ChangeType, ChunkStatus, ConflictType, DiffConfig, DiffError,
    Edit, FileDiff, FileHeader, LineEdit, LineRange, TextComparator,
};
