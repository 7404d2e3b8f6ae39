//! Source span and position tracking for precise diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line, column and byte index of a point in the source.
///
/// `line` and `column` are 1-based, `index` is the 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub index: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, index: u32) -> Self {
        Position { line, column, index }
    }

    /// The first position of any source text
    pub fn start() -> Self {
        Position::new(1, 1, 0)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Span in a source file (inclusive start, exclusive end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn len(self) -> u32 {
        self.end.index.saturating_sub(self.start.index)
    }

    pub fn is_empty(self) -> bool {
        self.start.index >= self.end.index
    }

    /// Combine two spans into a span that covers both
    pub fn merge(self, other: Span) -> Span {
        let start = if other.start.index < self.start.index { other.start } else { self.start };
        let end = if other.end.index > self.end.index { other.end } else { self.end };
        Span { start, end }
    }

    /// Check if this span contains the given byte offset
    pub fn contains(self, index: u32) -> bool {
        self.start.index <= index && index < self.end.index
    }

    /// Slice the spanned text out of the source it was produced from
    pub fn text(self, source: &str) -> Option<&str> {
        source.get(self.start.index as usize..self.end.index as usize)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Trait for AST nodes that have source spans
pub trait HasSpan {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32) -> Span {
        Span::new(Position::new(1, start + 1, start), Position::new(1, end + 1, end))
    }

    #[test]
    fn test_span_operations() {
        let span1 = span(0, 5);
        let span2 = span(3, 8);

        let merged = span1.merge(span2);
        assert_eq!(merged.start.index, 0);
        assert_eq!(merged.end.index, 8);

        assert!(span1.contains(2));
        assert!(!span1.contains(5));
        assert_eq!(span1.len(), 5);
        assert!(!span1.is_empty());
    }

    #[test]
    fn test_span_text() {
        let source = "func add";
        assert_eq!(span(5, 8).text(source), Some("add"));
        assert_eq!(span(5, 80).text(source), None);
    }

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::start().to_string(), "1:1");
    }
}
