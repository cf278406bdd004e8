// Chunk-based diff model
// Maps an old text onto a new text through a contiguous sequence of change chunks
// that can be edited live without recomputing the whole diff.

mod chunk;
mod comparator;
mod config;
mod edit;
mod error;
mod file_diff;
mod provider;
mod sequence;

pub use chunk::{ChangeChunk, ChangeSide, ChangeType, ChunkStatus, ConflictType, LineRange};
pub use comparator::TextComparator;
pub use config::DiffConfig;
pub use edit::{line_count, split_lines, Edit, LineEdit};
pub use error::{DiffError, DiffResult};
pub use file_diff::{FileChangeType, FileDiff, FileHeader};
pub use provider::{LineDiffProvider, SimilarDiffProvider};
pub use sequence::{apply_change, AffectedChunks, ChunkSequence, LineDelta};
