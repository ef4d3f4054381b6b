//! Core editor types: positions, selections and history counters.
//!
//! These types are surface-agnostic and can be used with any `EditSurface`.

use std::fmt;
use std::str::FromStr;

use crate::error::ToolbarError;

/// A location in the document as zero-based line and column.
///
/// Columns count Unicode scalar values (chars), not bytes or UTF-16 units.
/// Ordering is by line first, then column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Column zero of the given line.
    pub fn line_start(line: usize) -> Self {
        Self { line, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl FromStr for Position {
    type Err = ToolbarError;

    /// Parses `LINE:COLUMN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolbarError::InvalidPosition(s.to_string());
        let (line, column) = s.trim().split_once(':').ok_or_else(invalid)?;
        let line = line.trim().parse().map_err(|_| invalid())?;
        let column = column.trim().parse().map_err(|_| invalid())?;
        Ok(Self { line, column })
    }
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: Position,
    /// Where cursor is now
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (caret only).
    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }

    pub fn is_multi_line(&self) -> bool {
        self.anchor.line != self.head.line
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }
}

impl FromStr for Selection {
    type Err = ToolbarError;

    /// Parses `L:C` (a caret) or `L:C-L:C` (anchor then head).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((anchor, head)) => Ok(Self::new(anchor.parse()?, head.parse()?)),
            None => Ok(Self::caret(s.parse()?)),
        }
    }
}

/// Number of undo and redo steps available on a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistorySize {
    pub undo: usize,
    pub redo: usize,
}

/// Enablement flags for the undo and redo toolbar buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

impl From<HistorySize> for HistoryState {
    fn from(size: HistorySize) -> Self {
        Self {
            can_undo: size.undo > 0,
            can_redo: size.redo > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_ordering() {
        let sel = Selection::new(Position::new(2, 1), Position::new(0, 4));
        assert_eq!(sel.start(), Position::new(0, 4));
        assert_eq!(sel.end(), Position::new(2, 1));
        assert!(sel.is_backwards());
        assert!(sel.is_multi_line());
        assert!(!sel.is_caret());
    }

    #[test]
    fn test_same_line_ordering_uses_column() {
        let sel = Selection::new(Position::new(1, 9), Position::new(1, 3));
        assert_eq!(sel.start().column, 3);
        assert_eq!(sel.end().column, 9);
        assert!(!sel.is_multi_line());
    }

    #[test]
    fn test_parse_selection() {
        let sel: Selection = "0:2-1:5".parse().unwrap();
        assert_eq!(sel.anchor, Position::new(0, 2));
        assert_eq!(sel.head, Position::new(1, 5));

        let caret: Selection = "3:0".parse().unwrap();
        assert!(caret.is_caret());
        assert_eq!(caret.head, Position::line_start(3));

        assert!("nope".parse::<Selection>().is_err());
        assert!("1:x".parse::<Position>().is_err());
    }

    #[test]
    fn test_history_state() {
        let state = HistoryState::from(HistorySize { undo: 2, redo: 0 });
        assert!(state.can_undo);
        assert!(!state.can_redo);
        assert_eq!(HistoryState::from(HistorySize::default()), HistoryState::default());
    }
}
