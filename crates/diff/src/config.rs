use similar::Algorithm;
use std::time::Duration;

use crate::comparator::TextComparator;
use crate::edit::Edit;
use crate::error::DiffResult;
use crate::file_diff::{FileDiff, FileHeader};
use crate::provider::{LineDiffProvider, SimilarDiffProvider};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for computing line diffs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiffConfig {
    algorithm: Algorithm,
    comparator: TextComparator,
    timeout: Option<Duration>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
            comparator: TextComparator::Default,
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl DiffConfig {
    /// Set the diff algorithm
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set how lines are compared
    pub fn comparator(mut self, comparator: TextComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Limit the time spent diffing; `None` waits for the exact result
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn algorithm_kind(&self) -> Algorithm {
        self.algorithm
    }

    pub fn comparator_kind(&self) -> TextComparator {
        self.comparator
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.timeout
    }

    /// The provider these settings describe
    pub fn provider(&self) -> SimilarDiffProvider {
        SimilarDiffProvider {
            algorithm: self.algorithm,
            timeout: self.timeout,
        }
    }

    /// Raw edits between two texts
    pub fn edits(&self, old_text: &str, new_text: &str) -> Vec<Edit> {
        self.provider().diff_lines(old_text, new_text, self.comparator)
    }

    /// Diff two texts without file identity
    pub fn diff(&self, old_text: &str, new_text: &str) -> DiffResult<FileDiff> {
        FileDiff::new(FileHeader::default(), old_text, new_text, self)
    }
}
