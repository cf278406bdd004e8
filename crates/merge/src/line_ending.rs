use derive_more::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line terminator convention of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineEnding {
    /// `\n`
    #[display(fmt = "LF")]
    Unix,

    /// `\r\n`
    #[display(fmt = "CRLF")]
    Windows,

    /// `\r`
    #[display(fmt = "CR")]
    Mac,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
            LineEnding::Mac => "\r",
        }
    }

    /// The convention of the first terminator in `text`, if it has any
    pub fn detect(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let pos = bytes.iter().position(|&b| b == b'\n' || b == b'\r')?;
        Some(match (bytes[pos], bytes.get(pos + 1)) {
            (b'\n', _) => LineEnding::Unix,
            (_, Some(b'\n')) => LineEnding::Windows,
            _ => LineEnding::Mac,
        })
    }

    /// The convention of the platform this was built for
    pub fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::Windows
        } else {
            LineEnding::Unix
        }
    }
}

/// Rewrite every line terminator in `text` to `ending`
pub fn adjust_line_endings(text: &str, ending: LineEnding) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(ending.as_str());
            }
            '\n' => out.push_str(ending.as_str()),
            c => out.push(c),
        }
    }
    out
}
