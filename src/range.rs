use miette::SourceSpan;
use serde::Serialize;
use std::fmt;

/// A location in the source text.
///
/// `line` and `column` are 1-based and count characters, `index` is the
/// 0-based byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, index: usize) -> Self {
        Self {
            line,
            column,
            index,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open span of source text, `begin` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub begin: Position,
    pub end: Position,
}

impl Range {
    pub fn new(begin: Position, end: Position) -> Self {
        Self { begin, end }
    }

    /// The span starting where `self` starts and ending where `other` ends.
    #[must_use]
    pub fn to(self, other: Range) -> Range {
        Range::new(self.begin, other.end)
    }

    pub fn len(&self) -> usize {
        self.end.index.saturating_sub(self.begin.index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

impl From<Range> for SourceSpan {
    fn from(range: Range) -> Self {
        (range.begin.index, range.len()).into()
    }
}
