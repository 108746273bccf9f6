//! Source spans and editor position addressing
//!
//! Editors address text either by (line, character) pairs or by an absolute
//! offset, and both count UTF-16 code units. The parser works in byte
//! offsets. `LineIndex` converts between the two worlds.

use serde::{Deserialize, Serialize};

/// Editor-style position: 0-based line, 0-based UTF-16 column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Cursor supplied by the host editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Line/column position
    Position(Position),
    /// Absolute offset in UTF-16 code units from the start of the document
    Offset(usize),
}

impl From<Position> for Cursor {
    fn from(position: Position) -> Self {
        Cursor::Position(position)
    }
}

/// Contiguous region of a document
///
/// `start`/`end` are byte offsets (end exclusive). Lines are 1-based,
/// columns 0-based UTF-16; `end_column` is the column just past the last
/// character, matching how editors express range ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    /// Get the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains another span
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Inclusive containment: a cursor sitting just past the closing
    /// brace still belongs to the construct.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Line table over a document
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Byte range of a 0-based line, excluding its newline
    fn line_bounds(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        Some((start, end))
    }

    /// Editor position of a byte offset
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        let character = self
            .text
            .get(start..offset)
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(0);
        Position {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Resolve a cursor to a byte offset
    ///
    /// A column past the end of its line clamps to the line end, as editors
    /// do. A line or absolute offset outside the document yields `None`.
    pub fn byte_offset(&self, cursor: Cursor) -> Option<usize> {
        match cursor {
            Cursor::Position(position) => self.position_to_byte(position),
            Cursor::Offset(offset) => self.utf16_to_byte(offset),
        }
    }

    fn position_to_byte(&self, position: Position) -> Option<usize> {
        let (start, end) = self.line_bounds(position.line as usize)?;
        let target = position.character as usize;
        let mut column = 0;
        for (i, ch) in self.text[start..end].char_indices() {
            if column >= target {
                return Some(start + i);
            }
            column += ch.len_utf16();
        }
        Some(end)
    }

    fn utf16_to_byte(&self, target: usize) -> Option<usize> {
        let mut units = 0;
        for (i, ch) in self.text.char_indices() {
            if units >= target {
                return Some(i);
            }
            units += ch.len_utf16();
            if units > target {
                // Offset points into a surrogate pair; snap to its start
                return Some(i);
            }
        }
        (units == target).then_some(self.text.len())
    }

    /// Build a span from byte offsets
    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        let start_pos = self.position_of(start);
        let end_pos = self.position_of(end);
        SourceSpan {
            start,
            end,
            start_line: start_pos.line + 1,
            start_column: start_pos.character,
            end_line: end_pos.line + 1,
            end_column: end_pos.character,
        }
    }
}
