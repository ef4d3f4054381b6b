//! Text buffer abstraction for surface storage.
//!
//! The `TextBuffer` trait provides a common interface for text storage with
//! line-oriented helpers on top, so surfaces can address text by `Position`
//! while the backing store works in char offsets.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

use crate::types::Position;

/// Editable text addressed by char offset.
///
/// Offsets and ranges count chars. Byte length is exposed for callers that
/// size UTF-8 output.
pub trait TextBuffer {
    fn len_bytes(&self) -> usize;

    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    fn insert(&mut self, char_offset: usize, text: &str);

    fn delete(&mut self, char_range: Range<usize>);

    /// Delete then insert at the range start.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Text in a char range, or None when the range is out of bounds.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    fn char_at(&self, char_offset: usize) -> Option<char>;

    fn to_string(&self) -> String;

    /// Number of lines. An empty buffer, or a trailing newline, still counts
    /// a final empty line.
    fn len_lines(&self) -> usize;

    /// Char offset of the first char of a line.
    fn line_to_char(&self, line_idx: usize) -> usize;

    /// Line index containing a char offset.
    fn char_to_line(&self, char_offset: usize) -> usize;

    /// Line content without its line terminator. None past the last line.
    fn line(&self, line_idx: usize) -> Option<SmolStr> {
        if line_idx >= self.len_lines() {
            return None;
        }
        let start = self.line_to_char(line_idx);
        let end = if line_idx + 1 < self.len_lines() {
            self.line_to_char(line_idx + 1)
        } else {
            self.len_chars()
        };
        let raw = self.slice(start..end)?;
        let trimmed = raw.strip_suffix('\n').unwrap_or(&raw);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Some(trimmed.to_smolstr())
    }

    /// Length in chars of a line, excluding its terminator.
    fn line_len(&self, line_idx: usize) -> usize {
        self.line(line_idx).map(|l| l.chars().count()).unwrap_or(0)
    }

    /// Clamp a position to the nearest valid location in the buffer.
    fn clamp_position(&self, pos: Position) -> Position {
        let last_line = self.len_lines().saturating_sub(1);
        let line = pos.line.min(last_line);
        Position::new(line, pos.column.min(self.line_len(line)))
    }

    /// Convert a (clamped) position to a char offset.
    fn position_to_char(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.line_to_char(pos.line) + pos.column
    }

    /// Convert a char offset to a position.
    fn char_to_position(&self, char_offset: usize) -> Position {
        let offset = char_offset.min(self.len_chars());
        let line = self.char_to_line(offset);
        Position::new(line, offset - self.line_to_char(line))
    }
}

/// `TextBuffer` over a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        self.rope.remove(char_range);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_to_char(&self, line_idx: usize) -> usize {
        self.rope.line_to_char(line_idx.min(self.rope.len_lines()))
    }

    fn char_to_line(&self, char_offset: usize) -> usize {
        self.rope.char_to_line(char_offset.min(self.rope.len_chars()))
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
