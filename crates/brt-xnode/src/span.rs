//! Source location tracking for diagnostics.
//!
//! Nodes produced by the front end carry the line (and, when known, the
//! column) of the source construct they were built from. Rewrites never
//! invent locations: nodes synthesized by a pass have no span.
//!
//! # Examples
//!
//! ```
//! # use brt_xnode::Span;
//! let span = Span::new(0, 42, 7);
//! assert_eq!(span.to_string(), "42:7");
//! assert_eq!(Span::line(3).to_string(), "3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact source location reference.
///
/// `line` is 1-based. A `column` of 0 means the front end did not record one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index of the originating file in the driver's file list
    #[serde(default)]
    pub file_id: u16,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, 0 when unknown)
    #[serde(default)]
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, line: u32, column: u32) -> Self {
        Self {
            file_id,
            line,
            column,
        }
    }

    /// Create a span that only knows its line, in the first file.
    pub fn line(line: u32) -> Self {
        Self::new(0, line, 0)
    }

    /// Whether a column was recorded.
    pub fn has_column(&self) -> bool {
        self.column != 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_column() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}", self.line)
        }
    }
}
