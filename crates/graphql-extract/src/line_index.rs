use crate::Position;
use std::collections::HashMap;

/// Offset-to-position conversion using a pre-built table of line starts.
///
/// Offsets are byte offsets into the indexed text. Columns are reported in
/// UTF-16 code units, so lines containing non-ASCII characters keep a small
/// side table of those characters to translate between the two units.
///
/// # Performance
///
/// - Build time: O(N) where N is the length of the source text
/// - `offset_to_position`: O(log L) line lookup plus O(W) over the wide
///   characters of that line (zero for ASCII lines)
/// - `position_to_offset`: O(1) plus the same wide character walk
///
/// # Example
///
/// ```
/// use graphql_extract::{LineIndex, Position};
///
/// let index = LineIndex::new("line 0\nline 1\nline 2");
///
/// assert_eq!(index.offset_to_position(7), Position::new(1, 0));
/// assert_eq!(index.position_to_offset(Position::new(1, 0)), Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    /// Index 0 is always 0 (start of file)
    /// Index N is the byte offset immediately after the Nth '\n' character
    line_starts: Vec<usize>,
    /// Non-ASCII characters keyed by line, ordered by their offset in the line
    wide_chars: HashMap<usize, Vec<WideChar>>,
    /// Length of the indexed text in bytes
    len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WideChar {
    /// Byte offset relative to the start of the line
    start: usize,
    len_utf8: usize,
    len_utf16: usize,
}

impl WideChar {
    const fn end(self) -> usize {
        self.start + self.len_utf8
    }

    const fn surplus(self) -> usize {
        self.len_utf8 - self.len_utf16
    }
}

impl LineIndex {
    /// Build a line index from source text
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide_chars: HashMap<usize, Vec<WideChar>> = HashMap::new();

        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
                continue;
            }

            if !ch.is_ascii() {
                let line = line_starts.len() - 1;
                let line_start = line_starts[line];
                wide_chars.entry(line).or_default().push(WideChar {
                    start: offset - line_start,
                    len_utf8: ch.len_utf8(),
                    len_utf16: ch.len_utf16(),
                });
            }
        }

        Self {
            line_starts,
            wide_chars,
            len: text.len(),
        }
    }

    /// Convert a byte offset to a line/column position
    ///
    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let column = offset - self.line_starts[line];
        let surplus: usize = self
            .wide_chars(line)
            .iter()
            .take_while(|wc| wc.end() <= column)
            .map(|wc| wc.surplus())
            .sum();

        Position::new(line, column - surplus)
    }

    /// Convert a line/column position to a byte offset
    ///
    /// Returns `None` if the line is out of bounds. Columns past the end of
    /// the line are not validated.
    #[must_use]
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line)?;

        let mut surplus = 0;
        for wc in self.wide_chars(position.line) {
            if wc.start - surplus >= position.character {
                break;
            }
            surplus += wc.surplus();
        }

        Some(line_start + position.character + surplus)
    }

    /// Get the number of lines in the indexed text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset of the start of a line
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte range of a line, excluding its terminating newline
    #[must_use]
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        let start = self.line_start(line)?;
        let end = self
            .line_start(line + 1)
            .map_or(self.len, |next| next - 1);
        Some(start..end)
    }

    fn wide_chars(&self, line: usize) -> &[WideChar] {
        self.wide_chars.get(&line).map_or(&[], Vec::as_slice)
    }
}
