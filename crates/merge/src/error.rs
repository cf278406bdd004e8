//! Error types for the merge crate.

use chunk_diff::DiffError;

use crate::merge_data::ConflictSide;

/// Errors that can occur while resolving a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Accepting the chunk would overwrite a conflicting change of the other side.
    #[error("chunk {index} of {side} conflicts with an unresolved change of the other side")]
    UnresolvedConflictWrite { side: ConflictSide, index: usize },

    /// The two diffs were not computed against the same fork-point text.
    #[error("yours and theirs were diffed against different base texts")]
    BaseMismatch,

    /// The base buffer could not be edited at the requested position.
    #[error("base buffer edit failed: {0}")]
    Buffer(String),

    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
