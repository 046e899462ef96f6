//! locations in the source text. a [Position] is a single point, a [Span]
//! is the range a token covers, from its first character (start) to just
//! after its last (end). tokens carry spans, AST nodes only carry the
//! position of the first token they were built from

use serde::Serialize;

/// line is 1-based, column is 0-based and resets on every newline, and
/// index is the absolute character offset into the source (0-based)
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}
impl Position {
    pub fn new() -> Self {
        Self { line: 1, column: 0, index: 0 }
    }
}
impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}
impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
    /// A zero-width span, which is what EOF gets
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }
    /// The slice of `source` this span covers, by character index
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        let mut offsets = source.char_indices().map(|(i, _)| i).chain(std::iter::once(source.len()));
        let lo = offsets.by_ref().nth(self.start.index).unwrap_or(source.len());
        let width = self.end.index.saturating_sub(self.start.index);
        let hi = if width == 0 { lo } else { offsets.nth(width - 1).unwrap_or(source.len()) };
        &source[lo..hi]
    }
}
impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}
