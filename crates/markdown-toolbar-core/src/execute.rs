//! Transform execution for edit surfaces.
//!
//! This module provides the `apply` function that performs an `Operation` on
//! any type implementing `EditSurface`, plus the individual wrap, line-prefix
//! and literal-insertion paths. Each path reads the context with the
//! classifier, decides between adding and stripping markers, mutates the
//! surface through `replace_range` and then repositions the selection over the
//! user's content.

use std::sync::LazyLock;

use regex::Regex;

use crate::actions::{InsertBlock, LinePrefix, Operation, WrapStyle};
use crate::classify::{ClassifyAt, State, classify};
use crate::surface::EditSurface;
use crate::types::Position;

static HEADER_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+").expect("invalid header regex"));

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\d+\.\s?").expect("invalid ordinal regex"));

/// Deepest header level. Toggling header on it removes the header.
const MAX_HEADER_LEVEL: usize = 6;

/// Apply an operation to a surface as a single undo step.
///
/// This is the central dispatch point for all text transforms. The surface is
/// focused afterwards.
pub fn apply<S: EditSurface + ?Sized>(surface: &mut S, operation: Operation) {
    tracing::debug!(?operation, "apply");
    batched(surface, |surface| match operation {
        Operation::Wrap(style) => apply_wrap(surface, style, style.is_fenced()),
        Operation::LinePrefix(kind) => apply_line_prefix(surface, kind),
        Operation::Insert(InsertBlock::HorizontalRule) => insert_horizontal_rule(surface),
        Operation::Insert(InsertBlock::Table) => insert_table(surface),
    });
}

/// Toggle code on the selection: inline code when the selection sits inside
/// one line without covering it, a fenced block otherwise.
pub fn toggle_code<S: EditSurface + ?Sized>(surface: &mut S) {
    batched(surface, |surface| {
        if selection_is_inline(surface) {
            apply_wrap(surface, WrapStyle::InlineCode, false);
        } else {
            apply_wrap(surface, WrapStyle::Code, true);
        }
    });
}

fn batched<S, F>(surface: &mut S, f: F)
where
    S: EditSurface + ?Sized,
    F: FnOnce(&mut S),
{
    surface.begin_batch();
    f(surface);
    surface.end_batch();
    surface.focus();
}

/// Wrap the selection in delimiters, or strip them when the selection start
/// is already inside that style.
///
/// `start_new_line` puts the delimiters on their own lines and moves the
/// resulting selection down one line.
pub fn apply_wrap<S: EditSurface + ?Sized>(surface: &mut S, style: WrapStyle, start_new_line: bool) {
    let states = classify(surface, ClassifyAt::SelectionStart);
    let start = surface.selection_start();
    let end = surface.selection_end();
    let multi_line = start.line != end.line;
    let selected = surface.selected_text();
    let delim = style.delimiter();
    let delim_len = delim.chars().count();

    let (new_start, new_end) = if states.has_type(&style.state()) {
        let start_line = surface.line_text(start.line);
        let end_line = surface.line_text(end.line);
        let before: String = start_line.chars().take(start.column).collect();
        let after: String = end_line.chars().skip(end.column).collect();

        let (before, removed) = match before.strip_suffix(delim) {
            Some(trimmed) => (trimmed.to_string(), delim_len),
            None => (before, 0),
        };
        let after = after.strip_prefix(delim).unwrap_or(&after);

        tracing::debug!(style = style.name(), removed, "strip wrap");
        let line_end = Position::new(end.line, end_line.chars().count());
        surface.replace_range(
            &format!("{before}{selected}{after}"),
            Position::line_start(start.line),
            line_end,
        );

        let new_start = Position::new(start.line, start.column - removed);
        let new_end = if multi_line {
            end
        } else {
            Position::new(end.line, end.column - removed)
        };
        (new_start, new_end)
    } else {
        let placeholder = selected.is_empty();
        let body = if placeholder {
            format!("{} text", style.name())
        } else {
            selected.to_string()
        };
        let newline = if style.is_fenced() { "\n" } else { "" };
        surface.replace_range(
            &format!("{delim}{newline}{body}{newline}{delim}"),
            start,
            end,
        );

        let (new_start, new_end) = if start_new_line {
            let new_start = Position::line_start(start.line + 1);
            let new_end = if multi_line {
                Position::new(end.line + 1, end.column)
            } else {
                Position::new(start.line + 1, end.column - start.column)
            };
            (new_start, new_end)
        } else {
            let new_start = Position::new(start.line, start.column + delim_len);
            let new_end = if multi_line {
                end
            } else {
                Position::new(end.line, end.column + delim_len)
            };
            (new_start, new_end)
        };

        if placeholder {
            let body_len = body.chars().count();
            (new_start, Position::new(new_start.line, new_start.column + body_len))
        } else {
            (new_start, new_end)
        }
    };

    surface.set_selection(new_start, new_end);
}

/// Toggle a line prefix on every line from the selection start to its end.
///
/// Each line is classified on its own, so a mixed selection flips each line
/// independently. The selection is restored afterwards.
pub fn apply_line_prefix<S: EditSurface + ?Sized>(surface: &mut S, kind: LinePrefix) {
    let selection = surface.selection();
    let start = selection.start();
    let end = selection.end();

    for (line_count, line) in (start.line..=end.line).enumerate() {
        let states = classify(surface, ClassifyAt::LineStart(line));
        let text = surface.line_text(line);
        let active = states.contains(&kind.state());

        let replacement = match kind {
            LinePrefix::Header => toggle_header(&text),
            LinePrefix::Quote | LinePrefix::UnorderedList => {
                let symbol = kind.symbol().unwrap_or_default();
                if active {
                    text.chars().skip(2).collect()
                } else {
                    format!("{symbol} {text}")
                }
            }
            LinePrefix::OrderedList => {
                if active {
                    ORDINAL.replace(&text, "$1").into_owned()
                } else {
                    format!("{}. {text}", line_count + 1)
                }
            }
        };

        tracing::trace!(line, active, ?kind, "line prefix");
        replace_line(surface, line, &replacement);
    }

    surface.set_selection(selection.anchor, selection.head);
}

/// Add one header level, or remove the header at the deepest level.
fn toggle_header(text: &str) -> String {
    match HEADER_MARKS.find(text) {
        None => format!("# {text}"),
        Some(marks) if marks.len() == MAX_HEADER_LEVEL => {
            text.chars().skip(MAX_HEADER_LEVEL + 1).collect()
        }
        Some(_) => format!("#{text}"),
    }
}

fn replace_line<S: EditSurface + ?Sized>(surface: &mut S, line: usize, text: &str) {
    let len = surface.line_len(line);
    surface.replace_range(text, Position::line_start(line), Position::new(line, len));
}

/// Replace the selection with `text` and select part of it.
///
/// The new selection starts `cursor_offset` chars after the old selection
/// start and spans `selection_length` chars (the whole text when `None`).
pub fn insert_literal<S: EditSurface + ?Sized>(
    surface: &mut S,
    text: &str,
    cursor_offset: usize,
    selection_length: Option<usize>,
) {
    let start = surface.selection_start();
    surface.replace_selection(text);

    let anchor = Position::new(start.line, start.column + cursor_offset);
    let length = selection_length.unwrap_or_else(|| text.chars().count());
    surface.set_selection(anchor, Position::new(anchor.line, anchor.column + length));
}

/// Insert a two-column table template and select the first header cell.
pub fn insert_table<S: EditSurface + ?Sized>(surface: &mut S) {
    insert_literal(surface, InsertBlock::Table.template(), 2, Some(8));
}

/// Insert a horizontal rule on its own line and put the caret on it.
///
/// On an empty line with the caret at column 0 the rule is padded with single
/// newlines, otherwise with blank lines on both sides.
pub fn insert_horizontal_rule<S: EditSurface + ?Sized>(surface: &mut S) {
    let start = surface.selection_start();
    let blank_line = start.column == 0 && surface.line_text(start.line).trim().is_empty();
    let padding = if blank_line { "\n" } else { "\n\n" };
    let rule = InsertBlock::HorizontalRule.template();

    insert_literal(surface, &format!("{padding}{rule}{padding}"), 0, None);

    let lines_down = if blank_line { 1 } else { 2 };
    let caret = Position::new(start.line + lines_down, start.column);
    surface.set_selection(caret, caret);
}

/// Whether the selection sits on one line without covering the whole line.
pub fn selection_is_inline<S: EditSurface + ?Sized>(surface: &S) -> bool {
    let start = surface.selection_start();
    let end = surface.selection_end();
    start.line == end.line && end.column - start.column != surface.line_len(start.line)
}

/// Whether the line holding the selection head is a list item.
pub fn in_list<S: EditSurface + ?Sized>(surface: &S) -> bool {
    let line = surface.selection().head.line;
    let states = classify(surface, ClassifyAt::LineStart(line));
    states.contains(&State::UnorderedList) || states.contains(&State::OrderedList)
}

/// Prefix every selected line with one indent unit.
pub fn indent_lines<S: EditSurface + ?Sized>(surface: &mut S, unit: &str) {
    let selection = surface.selection();
    let unit_len = unit.chars().count();
    batched(surface, |surface| {
        for line in selection.start().line..=selection.end().line {
            let at = Position::line_start(line);
            surface.replace_range(unit, at, at);
        }
        let shift = |pos: Position| Position::new(pos.line, pos.column + unit_len);
        surface.set_selection(shift(selection.anchor), shift(selection.head));
    });
}

/// Remove up to one indent unit of leading whitespace from every selected
/// line. A unit is a tab or up to `tab_size` spaces.
pub fn outdent_lines<S: EditSurface + ?Sized>(surface: &mut S, tab_size: usize) {
    let selection = surface.selection();
    let removed_on = |surface: &mut S, line: usize| -> usize {
        let text = surface.line_text(line);
        let remove = if text.starts_with('\t') {
            1
        } else {
            text.chars().take(tab_size).take_while(|c| *c == ' ').count()
        };
        if remove > 0 {
            surface.replace_range("", Position::line_start(line), Position::new(line, remove));
        }
        remove
    };

    batched(surface, |surface| {
        let mut anchor = selection.anchor;
        let mut head = selection.head;
        for line in selection.start().line..=selection.end().line {
            let removed = removed_on(surface, line);
            if anchor.line == line {
                anchor.column = anchor.column.saturating_sub(removed);
            }
            if head.line == line {
                head.column = head.column.saturating_sub(removed);
            }
        }
        surface.set_selection(anchor, head);
    });
}
