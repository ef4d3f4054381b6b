//! Toolbar operations and actions.
//!
//! `Operation` is the closed set of text transforms the engine performs.
//! `ToolbarAction` is what a toolbar button or shortcut triggers; most map to
//! an operation, the rest drive history or editor chrome.

use std::fmt;
use std::str::FromStr;

use crate::classify::State;
use crate::error::ToolbarError;

/// Inline or fenced delimiters wrapped around the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapStyle {
    Strong,
    Italic,
    Strikethrough,
    InlineCode,
    /// Fenced code block. Delimiters go on their own lines.
    Code,
}

impl WrapStyle {
    pub fn delimiter(&self) -> &'static str {
        match self {
            WrapStyle::Strong => "**",
            WrapStyle::Italic => "*",
            WrapStyle::Strikethrough => "~~",
            WrapStyle::InlineCode => "`",
            WrapStyle::Code => "```",
        }
    }

    /// Name used for the placeholder text of an empty selection.
    pub fn name(&self) -> &'static str {
        match self {
            WrapStyle::Strong => "strong",
            WrapStyle::Italic => "italic",
            WrapStyle::Strikethrough => "strikethrough",
            WrapStyle::InlineCode => "inline-code",
            WrapStyle::Code => "code",
        }
    }

    pub fn state(&self) -> State {
        match self {
            WrapStyle::Strong => State::Strong,
            WrapStyle::Italic => State::Italic,
            WrapStyle::Strikethrough => State::Strikethrough,
            WrapStyle::InlineCode => State::InlineCode,
            WrapStyle::Code => State::Code,
        }
    }

    pub fn is_fenced(&self) -> bool {
        matches!(self, WrapStyle::Code)
    }
}

/// Per-line prefixes toggled on every line the selection touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinePrefix {
    Header,
    Quote,
    UnorderedList,
    /// Numbered per line, starting at 1.
    OrderedList,
}

impl LinePrefix {
    /// The marker symbol. Ordered lists compute theirs per line.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            LinePrefix::Header => Some("#"),
            LinePrefix::Quote => Some(">"),
            LinePrefix::UnorderedList => Some("*"),
            LinePrefix::OrderedList => None,
        }
    }

    pub fn state(&self) -> State {
        match self {
            LinePrefix::Header => State::Header,
            LinePrefix::Quote => State::Quote,
            LinePrefix::UnorderedList => State::UnorderedList,
            LinePrefix::OrderedList => State::OrderedList,
        }
    }
}

/// Literal blocks inserted at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertBlock {
    HorizontalRule,
    Table,
}

impl InsertBlock {
    pub fn template(&self) -> &'static str {
        match self {
            InsertBlock::HorizontalRule => "---",
            InsertBlock::Table => {
                "| Column 1 | Column 2 |\n| -------- | -------- |\n| Text     | Text     |"
            }
        }
    }
}

/// A text transform performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Wrap(WrapStyle),
    LinePrefix(LinePrefix),
    Insert(InsertBlock),
}

/// All toolbar buttons.
///
/// These are decoupled from how they're triggered (button, shortcut, CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
    Undo,
    Redo,
    Header,
    Strong,
    Italic,
    Strikethrough,
    Quote,
    HorizontalRule,
    Table,
    /// Inline code for a partial single-line selection, a fenced block otherwise.
    Code,
    UnorderedList,
    OrderedList,
    Fullscreen,
    SplitView,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 14] = [
        ToolbarAction::Undo,
        ToolbarAction::Redo,
        ToolbarAction::Header,
        ToolbarAction::Strong,
        ToolbarAction::Italic,
        ToolbarAction::Strikethrough,
        ToolbarAction::Quote,
        ToolbarAction::HorizontalRule,
        ToolbarAction::Table,
        ToolbarAction::Code,
        ToolbarAction::UnorderedList,
        ToolbarAction::OrderedList,
        ToolbarAction::Fullscreen,
        ToolbarAction::SplitView,
    ];

    /// Name used in toolbar layouts and shortcut maps.
    pub fn name(&self) -> &'static str {
        match self {
            ToolbarAction::Undo => "undo",
            ToolbarAction::Redo => "redo",
            ToolbarAction::Header => "header",
            ToolbarAction::Strong => "strong",
            ToolbarAction::Italic => "italic",
            ToolbarAction::Strikethrough => "strikethrough",
            ToolbarAction::Quote => "quote",
            ToolbarAction::HorizontalRule => "hr",
            ToolbarAction::Table => "table",
            ToolbarAction::Code => "code",
            ToolbarAction::UnorderedList => "unordered-list",
            ToolbarAction::OrderedList => "ordered-list",
            ToolbarAction::Fullscreen => "fullscreen",
            ToolbarAction::SplitView => "split-view",
        }
    }

    /// Button tooltip.
    pub fn title(&self) -> &'static str {
        match self {
            ToolbarAction::Undo => "Undo",
            ToolbarAction::Redo => "Redo",
            ToolbarAction::Header => "Header",
            ToolbarAction::Strong => "Bold",
            ToolbarAction::Italic => "Italic",
            ToolbarAction::Strikethrough => "Strikethrough",
            ToolbarAction::Quote => "Quote",
            ToolbarAction::HorizontalRule => "Horizontal Rule",
            ToolbarAction::Table => "Table",
            ToolbarAction::Code => "Code",
            ToolbarAction::UnorderedList => "Generic List",
            ToolbarAction::OrderedList => "Numbered List",
            ToolbarAction::Fullscreen => "Fullscreen",
            ToolbarAction::SplitView => "Split View",
        }
    }

    /// Button class name for hosts that style buttons individually.
    pub fn class_name(&self) -> &'static str {
        match self {
            ToolbarAction::Undo => "btn-undo",
            ToolbarAction::Redo => "btn-redo",
            ToolbarAction::Header => "btn-header",
            ToolbarAction::Strong => "btn-bold",
            ToolbarAction::Italic => "btn-italic",
            ToolbarAction::Strikethrough => "btn-strikethrough",
            ToolbarAction::Quote => "btn-quote-left",
            ToolbarAction::HorizontalRule => "btn-horizontal-rule",
            ToolbarAction::Table => "btn-table",
            ToolbarAction::Code => "btn-code",
            ToolbarAction::UnorderedList => "btn-list-ul",
            ToolbarAction::OrderedList => "btn-list-ol",
            ToolbarAction::Fullscreen => "btn-fullscreen",
            ToolbarAction::SplitView => "btn-split-view",
        }
    }

    /// Icon name, in material icon naming.
    pub fn icon(&self) -> &'static str {
        match self {
            ToolbarAction::Undo => "undo",
            ToolbarAction::Redo => "redo",
            ToolbarAction::Header => "text-fields",
            ToolbarAction::Strong => "format-bold",
            ToolbarAction::Italic => "format-italic",
            ToolbarAction::Strikethrough => "format-strikethrough",
            ToolbarAction::Quote => "format-quote",
            ToolbarAction::HorizontalRule => "trending-flat",
            ToolbarAction::Table => "grid-on",
            ToolbarAction::Code => "code",
            ToolbarAction::UnorderedList => "format-list-bulleted",
            ToolbarAction::OrderedList => "format-list-numbered",
            ToolbarAction::Fullscreen => "fullscreen",
            ToolbarAction::SplitView => "chrome-reader-mode",
        }
    }

    /// The engine operation behind this action, if it is a plain transform.
    ///
    /// `Code` is not a plain transform: it picks inline or fenced code from
    /// the selection shape.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ToolbarAction::Strong => Some(Operation::Wrap(WrapStyle::Strong)),
            ToolbarAction::Italic => Some(Operation::Wrap(WrapStyle::Italic)),
            ToolbarAction::Strikethrough => Some(Operation::Wrap(WrapStyle::Strikethrough)),
            ToolbarAction::Header => Some(Operation::LinePrefix(LinePrefix::Header)),
            ToolbarAction::Quote => Some(Operation::LinePrefix(LinePrefix::Quote)),
            ToolbarAction::UnorderedList => Some(Operation::LinePrefix(LinePrefix::UnorderedList)),
            ToolbarAction::OrderedList => Some(Operation::LinePrefix(LinePrefix::OrderedList)),
            ToolbarAction::HorizontalRule => Some(Operation::Insert(InsertBlock::HorizontalRule)),
            ToolbarAction::Table => Some(Operation::Insert(InsertBlock::Table)),
            ToolbarAction::Undo
            | ToolbarAction::Redo
            | ToolbarAction::Code
            | ToolbarAction::Fullscreen
            | ToolbarAction::SplitView => None,
        }
    }

    /// Whether this action edits the text.
    pub fn is_edit(&self) -> bool {
        !matches!(self, ToolbarAction::Fullscreen | ToolbarAction::SplitView)
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolbarAction {
    type Err = ToolbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolbarAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| ToolbarError::UnknownAction(s.to_string()))
    }
}

/// One slot of a toolbar layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutItem {
    Separator,
    Action(ToolbarAction),
}

impl LayoutItem {
    pub const SEPARATOR: &'static str = "|";
}

impl FromStr for LayoutItem {
    type Err = ToolbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::SEPARATOR {
            Ok(LayoutItem::Separator)
        } else {
            s.parse().map(LayoutItem::Action)
        }
    }
}

impl fmt::Display for LayoutItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutItem::Separator => f.write_str(Self::SEPARATOR),
            LayoutItem::Action(action) => action.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for action in ToolbarAction::ALL {
            assert_eq!(action.name().parse::<ToolbarAction>(), Ok(action));
        }
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(
            "bold".parse::<ToolbarAction>(),
            Err(ToolbarError::UnknownAction("bold".into()))
        );
    }

    #[test]
    fn test_layout_items() {
        assert_eq!("|".parse::<LayoutItem>(), Ok(LayoutItem::Separator));
        assert_eq!(
            "hr".parse::<LayoutItem>(),
            Ok(LayoutItem::Action(ToolbarAction::HorizontalRule))
        );
        assert!("||".parse::<LayoutItem>().is_err());
    }

    #[test]
    fn test_operations() {
        assert_eq!(
            ToolbarAction::Strong.operation(),
            Some(Operation::Wrap(WrapStyle::Strong))
        );
        assert_eq!(ToolbarAction::Code.operation(), None);
        assert_eq!(ToolbarAction::Undo.operation(), None);
        assert!(ToolbarAction::Undo.is_edit());
        assert!(!ToolbarAction::SplitView.is_edit());
    }

    #[test]
    fn test_wrap_styles() {
        assert_eq!(WrapStyle::Code.delimiter(), "```");
        assert!(WrapStyle::Code.is_fenced());
        assert!(!WrapStyle::InlineCode.is_fenced());
        assert_eq!(WrapStyle::InlineCode.state(), State::InlineCode);
        assert_eq!(LinePrefix::OrderedList.symbol(), None);
    }
}
