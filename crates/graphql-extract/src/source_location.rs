/// Position in a source file (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column (0-indexed, UTF-16 code units)
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Range in a source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `line` lies within the lines spanned by this range (inclusive)
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

/// Where an extracted fragment lives in its host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Byte offset in the host document
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Range in the host document
    pub range: Range,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(offset: usize, length: usize, range: Range) -> Self {
        Self {
            offset,
            length,
            range,
        }
    }

    #[must_use]
    pub const fn end_offset(&self) -> usize {
        self.offset + self.length
    }
}
