use derive_more::Display;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How two lines are compared when computing a diff.
///
/// Passed explicitly to every diff computation; there is no process-wide setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextComparator {
    /// Lines must match exactly
    #[default]
    #[display(fmt = "DEFAULT")]
    Default,

    /// All whitespace is ignored
    #[display(fmt = "IGNORE ALL")]
    IgnoreAll,

    /// Runs of whitespace compare equal to a single space; trailing whitespace is ignored
    #[display(fmt = "IGNORE CHANGE")]
    IgnoreChange,

    /// Leading whitespace is ignored
    #[display(fmt = "IGNORE LEADING")]
    IgnoreLeading,

    /// Trailing whitespace, including the line terminator, is ignored
    #[display(fmt = "IGNORE TRAILING")]
    IgnoreTrailing,
}

impl TextComparator {
    pub const ALL: [TextComparator; 5] = [
        TextComparator::Default,
        TextComparator::IgnoreAll,
        TextComparator::IgnoreChange,
        TextComparator::IgnoreLeading,
        TextComparator::IgnoreTrailing,
    ];

    /// Look a comparator up by its display name
    pub fn parse(display: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|comparator| comparator.to_string() == display)
    }

    /// The key a line is compared by
    pub fn normalize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match self {
            TextComparator::Default => Cow::Borrowed(line),
            TextComparator::IgnoreAll => line.chars().filter(|c| !c.is_whitespace()).collect(),
            TextComparator::IgnoreChange => {
                let mut key = String::with_capacity(line.len());
                let mut in_whitespace = false;
                for c in line.trim_end().chars() {
                    if c.is_whitespace() {
                        if !in_whitespace {
                            key.push(' ');
                        }
                        in_whitespace = true;
                    } else {
                        key.push(c);
                        in_whitespace = false;
                    }
                }
                Cow::Owned(key)
            }
            TextComparator::IgnoreLeading => Cow::Borrowed(line.trim_start()),
            TextComparator::IgnoreTrailing => Cow::Borrowed(line.trim_end()),
        }
    }

    /// Whether two lines are equal under this comparator
    pub fn equals(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}
