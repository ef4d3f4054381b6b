//! The host editing surface abstraction.
//!
//! `EditSurface` is everything the toolbar engine needs from the widget that
//! holds the text: line access, range replacement, selection, token styles,
//! and history. `PlainSurface<T>` is a field-based implementation over any
//! undoable `TextBuffer`, usable headless and in tests.

use smol_str::SmolStr;

use crate::text::{EditorRope, TextBuffer};
use crate::tokenize;
use crate::types::{HistorySize, Position, Selection};
use crate::undo::{UndoManager, UndoableBuffer};

/// Core trait for a text editing surface.
///
/// All positions are zero-based line/column pairs counted in chars.
/// Implementations clamp out-of-range positions instead of failing.
pub trait EditSurface {
    // === Required: Selection ===

    fn selection(&self) -> Selection;

    /// Set the selection. Positions are clamped to the buffer bounds.
    fn set_selection(&mut self, anchor: Position, head: Position);

    // === Required: Text access ===

    /// Line content without terminator. None past the last line.
    fn line(&self, line: usize) -> Option<SmolStr>;

    fn line_count(&self) -> usize;

    /// Replace the text between two positions.
    fn replace_range(&mut self, text: &str, from: Position, to: Position);

    /// Style tag of the token ending at `pos`, as space-separated names.
    fn token_type_at(&self, pos: Position) -> Option<SmolStr>;

    fn selected_text(&self) -> SmolStr;

    /// The full document.
    fn value(&self) -> String;

    /// Replace the full document. The caret moves to the start.
    fn set_value(&mut self, text: &str);

    // === Required: History ===

    fn history_size(&self) -> HistorySize;

    fn undo(&mut self) -> bool;

    fn redo(&mut self) -> bool;

    /// Monotonic counter bumped after every mutation.
    fn change_version(&self) -> u64;

    fn focus(&mut self);

    // === Provided ===

    fn selection_start(&self) -> Position {
        self.selection().start()
    }

    fn selection_end(&self) -> Position {
        self.selection().end()
    }

    /// Line content, empty past the last line.
    fn line_text(&self, line: usize) -> SmolStr {
        self.line(line).unwrap_or_default()
    }

    /// Length of a line in chars.
    fn line_len(&self, line: usize) -> usize {
        self.line_text(line).chars().count()
    }

    /// Replace the current selection with `text`.
    fn replace_selection(&mut self, text: &str) {
        let sel = self.selection();
        self.replace_range(text, sel.start(), sel.end());
    }

    /// Start a batch of edits that undo as one step.
    fn begin_batch(&mut self) {}

    fn end_batch(&mut self) {}

    /// Forget all undo and redo steps.
    fn clear_history(&mut self) {}
}

/// Simple field-based implementation of EditSurface.
///
/// Stores selection, focus and change version as plain fields and asks the
/// markdown tokenizer for token styles.
#[derive(Clone)]
pub struct PlainSurface<T: TextBuffer + UndoManager> {
    buffer: T,
    selection: Selection,
    version: u64,
    focused: bool,
}

impl<T: TextBuffer + UndoManager + Default> Default for PlainSurface<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: TextBuffer + UndoManager> PlainSurface<T> {
    pub fn new(buffer: T) -> Self {
        Self {
            buffer,
            selection: Selection::default(),
            version: 0,
            focused: false,
        }
    }

    /// Get direct access to the inner buffer (bypasses trait).
    pub fn inner(&self) -> &T {
        &self.buffer
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Drop focus, as when the host widget blurs.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    fn clamp_selection(&mut self) {
        self.selection = Selection::new(
            self.buffer.clamp_position(self.selection.anchor),
            self.buffer.clamp_position(self.selection.head),
        );
    }
}

impl PlainSurface<UndoableBuffer<EditorRope>> {
    /// A rope-backed surface with the default history depth.
    pub fn from_text(text: &str) -> Self {
        Self::new(UndoableBuffer::new(EditorRope::from_str(text), 100))
    }
}

impl<T: TextBuffer + UndoManager> EditSurface for PlainSurface<T> {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, anchor: Position, head: Position) {
        self.selection = Selection::new(anchor, head);
        self.clamp_selection();
    }

    fn line(&self, line: usize) -> Option<SmolStr> {
        self.buffer.line(line)
    }

    fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let a = self.buffer.position_to_char(from);
        let b = self.buffer.position_to_char(to);
        let range = a.min(b)..a.max(b);
        tracing::trace!(?from, ?to, len = text.len(), "replace_range");
        self.buffer.replace(range.clone(), text);

        let caret = self
            .buffer
            .char_to_position(range.start + text.chars().count());
        self.selection = Selection::caret(caret);
        self.version += 1;
    }

    fn token_type_at(&self, pos: Position) -> Option<SmolStr> {
        if pos.line >= self.buffer.len_lines() {
            return None;
        }
        let lines = (0..=pos.line).filter_map(|idx| self.buffer.line(idx));
        tokenize::token_type_at(lines, pos)
    }

    fn selected_text(&self) -> SmolStr {
        let start = self.buffer.position_to_char(self.selection.start());
        let end = self.buffer.position_to_char(self.selection.end());
        self.buffer.slice(start..end).unwrap_or_default()
    }

    fn value(&self) -> String {
        self.buffer.to_string()
    }

    fn set_value(&mut self, text: &str) {
        let len = self.buffer.len_chars();
        self.buffer.replace(0..len, text);
        self.selection = Selection::default();
        self.version += 1;
    }

    fn history_size(&self) -> HistorySize {
        self.buffer.history_size()
    }

    fn undo(&mut self) -> bool {
        let undone = self.buffer.undo();
        if undone {
            self.clamp_selection();
            self.version += 1;
        }
        undone
    }

    fn redo(&mut self) -> bool {
        let redone = self.buffer.redo();
        if redone {
            self.clamp_selection();
            self.version += 1;
        }
        redone
    }

    fn change_version(&self) -> u64 {
        self.version
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn begin_batch(&mut self) {
        self.buffer.begin_group();
    }

    fn end_batch(&mut self) {
        self.buffer.end_group();
    }

    fn clear_history(&mut self) {
        self.buffer.clear_history();
    }
}
