//! Error types for the diff crate.

/// Errors that can occur while building or mutating a diff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The chunk model lost its consistency, e.g. an edit claims a region outside
    /// of every known chunk or chunks stopped being contiguous.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A live edit addressed characters past the end of the text.
    #[error("edit at offset {offset} removing {len} characters is outside of a text of {text_len} characters")]
    EditOutOfBounds {
        offset: usize,
        len: usize,
        text_len: usize,
    },

    /// A chunk index that does not exist in the sequence.
    #[error("chunk index {index} out of range for {len} chunks")]
    ChunkOutOfRange { index: usize, len: usize },
}

impl DiffError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        DiffError::InvariantViolation(message.into())
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
