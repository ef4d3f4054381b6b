//! Grouped undo/redo history for surface edits.
//!
//! `UndoableBuffer<T>` sits in front of any `TextBuffer` and logs each change
//! as it passes through. Changes made between `begin_group` and `end_group`
//! form one history step, which is how a toolbar action touching several lines
//! stays a single undo.

use std::collections::VecDeque;
use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::text::TextBuffer;
use crate::types::HistorySize;

/// History control for a buffer.
///
/// `undo` and `redo` apply the change to the text; they are not bookkeeping
/// only.
pub trait UndoManager {
    fn can_undo(&self) -> bool {
        self.history_size().undo > 0
    }

    fn can_redo(&self) -> bool {
        self.history_size().redo > 0
    }

    /// Number of undo and redo steps currently available.
    fn history_size(&self) -> HistorySize;

    /// Revert the latest step. False when there is nothing to undo.
    fn undo(&mut self) -> bool;

    /// Re-apply the latest undone step. False when there is nothing to redo.
    fn redo(&mut self) -> bool;

    fn clear_history(&mut self);

    /// Start collecting edits into a single undo step. Groups nest; only the
    /// outermost `end_group` closes the step.
    fn begin_group(&mut self);

    fn end_group(&mut self);
}

/// One splice: `removed` was replaced by `added` at char offset `at`.
#[derive(Debug, Clone)]
struct Change {
    at: usize,
    removed: SmolStr,
    added: SmolStr,
}

impl Change {
    fn added_range(&self) -> Range<usize> {
        self.at..self.at + self.added.chars().count()
    }

    fn removed_range(&self) -> Range<usize> {
        self.at..self.at + self.removed.chars().count()
    }
}

/// Changes in the order they were applied.
type Step = Vec<Change>;

/// Buffer wrapper that records every edit for undo.
///
/// Edits made through `inner_mut` skip the log.
#[derive(Clone)]
pub struct UndoableBuffer<T> {
    buffer: T,
    done: VecDeque<Step>,
    undone: Vec<Step>,
    open: Option<Step>,
    depth: usize,
    max_steps: usize,
}

impl<T: TextBuffer + Default> Default for UndoableBuffer<T> {
    fn default() -> Self {
        Self::new(T::default(), 100)
    }
}

impl<T: TextBuffer> UndoableBuffer<T> {
    /// Wrap `buffer`, keeping at most `max_steps` undo steps.
    pub fn new(buffer: T, max_steps: usize) -> Self {
        Self {
            buffer,
            done: VecDeque::new(),
            undone: Vec::new(),
            open: None,
            depth: 0,
            max_steps,
        }
    }

    pub fn inner(&self) -> &T {
        &self.buffer
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.buffer
    }

    fn log(&mut self, at: usize, removed: &str, added: &str) {
        if removed.is_empty() && added.is_empty() {
            return;
        }
        self.undone.clear();

        let change = Change {
            at,
            removed: removed.to_smolstr(),
            added: added.to_smolstr(),
        };
        match self.open.as_mut() {
            Some(step) => step.push(change),
            None => self.commit(vec![change]),
        }
    }

    fn commit(&mut self, step: Step) {
        self.done.push_back(step);
        while self.done.len() > self.max_steps {
            self.done.pop_front();
        }
    }

    fn splice(&mut self, range: Range<usize>, text: &str) {
        if !range.is_empty() {
            self.buffer.delete(range.clone());
        }
        if !text.is_empty() {
            self.buffer.insert(range.start, text);
        }
    }
}

impl<T: TextBuffer> TextBuffer for UndoableBuffer<T> {
    fn len_bytes(&self) -> usize {
        self.buffer.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.log(char_offset, "", text);
        self.buffer.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let removed = self.buffer.slice(char_range.clone()).unwrap_or_default();
        self.log(char_range.start, &removed, "");
        self.buffer.delete(char_range);
    }

    // One change, so a replace never splits across undo steps.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let removed = self.buffer.slice(char_range.clone()).unwrap_or_default();
        self.log(char_range.start, &removed, text);
        self.buffer.replace(char_range, text);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        self.buffer.slice(char_range)
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        self.buffer.char_at(char_offset)
    }

    fn to_string(&self) -> String {
        self.buffer.to_string()
    }

    fn len_lines(&self) -> usize {
        self.buffer.len_lines()
    }

    fn line_to_char(&self, line_idx: usize) -> usize {
        self.buffer.line_to_char(line_idx)
    }

    fn char_to_line(&self, char_offset: usize) -> usize {
        self.buffer.char_to_line(char_offset)
    }
}

impl<T: TextBuffer> UndoManager for UndoableBuffer<T> {
    fn history_size(&self) -> HistorySize {
        HistorySize {
            undo: self.done.len(),
            redo: self.undone.len(),
        }
    }

    fn undo(&mut self) -> bool {
        let Some(step) = self.done.pop_back() else {
            return false;
        };
        tracing::trace!(changes = step.len(), "undo");
        for change in step.iter().rev() {
            self.splice(change.added_range(), &change.removed);
        }
        self.undone.push(step);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(step) = self.undone.pop() else {
            return false;
        };
        tracing::trace!(changes = step.len(), "redo");
        for change in &step {
            self.splice(change.removed_range(), &change.added);
        }
        self.done.push_back(step);
        true
    }

    fn clear_history(&mut self) {
        self.done.clear();
        self.undone.clear();
        if let Some(step) = self.open.as_mut() {
            step.clear();
        }
    }

    fn begin_group(&mut self) {
        if self.depth == 0 {
            self.open = Some(Step::new());
        }
        self.depth += 1;
    }

    fn end_group(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        if let Some(step) = self.open.take() {
            if !step.is_empty() {
                self.commit(step);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorRope;

    fn buffer(text: &str) -> UndoableBuffer<EditorRope> {
        UndoableBuffer::new(EditorRope::from_str(text), 100)
    }

    #[test]
    fn test_insert_then_undo_redo() {
        let mut buf = buffer("# Title");
        assert!(!buf.can_undo());

        buf.insert(0, "#");
        assert_eq!(buf.to_string(), "## Title");

        assert!(buf.undo());
        assert_eq!(buf.to_string(), "# Title");
        assert_eq!(buf.history_size(), HistorySize { undo: 0, redo: 1 });

        assert!(buf.redo());
        assert_eq!(buf.to_string(), "## Title");
        assert!(!buf.can_redo());
    }

    #[test]
    fn test_delete_restores_removed_text() {
        let mut buf = buffer("> quoted");
        buf.delete(0..2);
        assert_eq!(buf.to_string(), "quoted");
        assert!(buf.undo());
        assert_eq!(buf.to_string(), "> quoted");
    }

    #[test]
    fn test_replace_counts_once() {
        let mut buf = buffer("some **bold** text");
        buf.replace(5..13, "bold");
        assert_eq!(buf.to_string(), "some bold text");
        assert_eq!(buf.history_size(), HistorySize { undo: 1, redo: 0 });

        assert!(buf.undo());
        assert_eq!(buf.to_string(), "some **bold** text");
    }

    #[test]
    fn test_nested_groups_make_one_step() {
        let mut buf = buffer("a\nb");

        buf.begin_group();
        buf.insert(0, "* ");
        buf.begin_group();
        buf.insert(4, "* ");
        buf.end_group();
        assert_eq!(buf.history_size().undo, 0);
        buf.end_group();

        assert_eq!(buf.to_string(), "* a\n* b");
        assert_eq!(buf.history_size().undo, 1);

        assert!(buf.undo());
        assert_eq!(buf.to_string(), "a\nb");
        assert!(buf.redo());
        assert_eq!(buf.to_string(), "* a\n* b");
    }

    #[test]
    fn test_empty_and_unbalanced_groups() {
        let mut buf = buffer("x");
        buf.begin_group();
        buf.end_group();
        // Stray close is ignored
        buf.end_group();
        assert!(!buf.can_undo());

        buf.insert(1, "y");
        assert_eq!(buf.history_size().undo, 1);
    }

    #[test]
    fn test_edit_after_undo_drops_redo() {
        let mut buf = buffer("ab");
        buf.insert(2, "c");
        assert!(buf.undo());
        assert!(buf.can_redo());

        buf.insert(0, "z");
        assert!(!buf.can_redo());
        assert_eq!(buf.to_string(), "zab");
    }

    #[test]
    fn test_oldest_steps_are_evicted() {
        let mut buf = UndoableBuffer::new(EditorRope::new(), 2);
        for (i, ch) in ["1", "2", "3"].into_iter().enumerate() {
            buf.insert(i, ch);
        }
        assert_eq!(buf.history_size().undo, 2);

        while buf.undo() {}
        assert_eq!(buf.to_string(), "1");
    }

    #[test]
    fn test_clear_history() {
        let mut buf = buffer("");
        buf.insert(0, "text");
        assert!(buf.undo());
        buf.clear_history();
        assert_eq!(buf.history_size(), HistorySize::default());
        assert_eq!(buf.to_string(), "");
    }
}
