//! Context classification for toolbar operations.
//!
//! Asks the surface for the raw style tag at a position and normalizes it into
//! a `StateSet` the engine can test against, e.g. "is the selection already
//! bold?" or "is this line already a list item?".

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::surface::EditSurface;
use crate::types::Position;

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s").expect("invalid ordered list regex"));

/// A syntactic state the engine recognizes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Strong,
    Italic,
    Strikethrough,
    Code,
    InlineCode,
    Comment,
    Quote,
    UnorderedList,
    OrderedList,
    Header,
    Hr,
    /// A raw tag with no engine meaning, kept as reported.
    Other(SmolStr),
}

impl State {
    pub fn as_str(&self) -> &str {
        match self {
            State::Strong => "strong",
            State::Italic => "italic",
            State::Strikethrough => "strikethrough",
            State::Code => "code",
            State::InlineCode => "inline-code",
            State::Comment => "comment",
            State::Quote => "quote",
            State::UnorderedList => "unordered-list",
            State::OrderedList => "ordered-list",
            State::Header => "header",
            State::Hr => "hr",
            State::Other(tag) => tag.as_str(),
        }
    }

    /// Map a single raw tag. List tags need the line text and are handled by
    /// the caller.
    fn from_tag(tag: &str) -> Self {
        match tag {
            "strong" => State::Strong,
            "em" | "italic" => State::Italic,
            "strikethrough" => State::Strikethrough,
            "code" => State::Code,
            "inline-code" => State::InlineCode,
            "comment" => State::Comment,
            "quote" => State::Quote,
            "unordered-list" => State::UnorderedList,
            "ordered-list" => State::OrderedList,
            "header" => State::Header,
            "hr" => State::Hr,
            t if is_depth_tag(t, "header-") => State::Header,
            t if is_depth_tag(t, "quote-") => State::Quote,
            other => State::Other(SmolStr::new(other)),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_depth_tag(tag: &str, prefix: &str) -> bool {
    tag.strip_prefix(prefix)
        .is_some_and(|depth| !depth.is_empty() && depth.chars().all(|c| c.is_ascii_digit()))
}

/// Operation states that are also satisfied by another tag. Code of either
/// kind is reported by the tokenizer as `comment`.
static ALIASES: &[(State, State)] = &[
    (State::Code, State::Comment),
    (State::InlineCode, State::Comment),
];

/// The states present at one position, in tag order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSet(Vec<State>);

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: State) {
        if !self.0.contains(&state) {
            self.0.push(state);
        }
    }

    pub fn contains(&self, state: &State) -> bool {
        self.0.contains(state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.0.iter()
    }

    /// Whether `state` applies here, directly or through an alias.
    pub fn has_type(&self, state: &State) -> bool {
        if self.contains(state) {
            return true;
        }
        ALIASES
            .iter()
            .find(|(key, _)| key == state)
            .is_some_and(|(_, alias)| self.contains(alias))
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where to classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifyAt {
    /// The start of the current selection.
    SelectionStart,
    Position(Position),
    /// The start of a line, looking at its first char.
    LineStart(usize),
}

/// Compute the states at a position of the surface.
///
/// Always computed fresh from the surface; nothing is cached between calls.
pub fn classify<S: EditSurface + ?Sized>(surface: &S, at: ClassifyAt) -> StateSet {
    let pos = match at {
        ClassifyAt::SelectionStart => surface.selection_start(),
        ClassifyAt::Position(pos) => pos,
        ClassifyAt::LineStart(line) => Position::new(line, 1),
    };

    let Some(raw) = surface.token_type_at(pos) else {
        return StateSet::new();
    };

    let states = normalize(&raw, || surface.line_text(pos.line));
    tracing::trace!(%pos, raw = %raw, ?states, "classify");
    states
}

/// Normalize a raw tag string. `line_text` is only consulted for list tags.
pub fn normalize(raw: &str, line_text: impl FnOnce() -> SmolStr) -> StateSet {
    let mut line_text = Some(line_text);
    let mut list_kind = None;

    raw.split_whitespace()
        .map(|tag| {
            if tag != "variable-2" {
                return State::from_tag(tag);
            }
            if let Some(text) = line_text.take() {
                list_kind = Some(if ORDERED_ITEM.is_match(&text()) {
                    State::OrderedList
                } else {
                    State::UnorderedList
                });
            }
            list_kind.clone().unwrap_or(State::UnorderedList)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PlainSurface;

    fn states(raw: &str, line: &str) -> Vec<State> {
        normalize(raw, || SmolStr::new(line)).iter().cloned().collect()
    }

    #[test]
    fn test_list_tag_resolves_by_line_text() {
        assert_eq!(states("variable-2", "1. one"), vec![State::OrderedList]);
        assert_eq!(states("variable-2", "  10. ten"), vec![State::OrderedList]);
        assert_eq!(states("variable-2", "* one"), vec![State::UnorderedList]);
        assert_eq!(states("variable-2", "1) one"), vec![State::UnorderedList]);
    }

    #[test]
    fn test_depth_tags_fold() {
        assert_eq!(states("header header-2", "## h"), vec![State::Header]);
        assert_eq!(states("quote quote-3", ">>> q"), vec![State::Quote]);
        assert_eq!(
            states("em strong", ""),
            vec![State::Italic, State::Strong]
        );
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        assert_eq!(
            states("link strong", ""),
            vec![State::Other("link".into()), State::Strong]
        );
        assert_eq!(states("header-x", ""), vec![State::Other("header-x".into())]);
    }

    #[test]
    fn test_has_type_aliases() {
        let set: StateSet = [State::Comment].into_iter().collect();
        assert!(set.has_type(&State::Code));
        assert!(set.has_type(&State::InlineCode));
        assert!(!set.has_type(&State::Strong));

        let set: StateSet = [State::Code].into_iter().collect();
        assert!(set.has_type(&State::Code));
        assert!(!set.has_type(&State::Comment));
    }

    #[test]
    fn test_classify_selection_start() {
        let mut surface = PlainSurface::from_text("plain **bold** text");
        surface.set_selection(Position::new(0, 8), Position::new(0, 12));
        let set = classify(&surface, ClassifyAt::SelectionStart);
        assert!(set.contains(&State::Strong));

        surface.set_selection(Position::new(0, 2), Position::new(0, 4));
        assert!(classify(&surface, ClassifyAt::SelectionStart).is_empty());
    }

    #[test]
    fn test_classify_line_start_looks_at_first_char() {
        let surface = PlainSurface::from_text("# Title\n1. first\n* item\n> quote\nplain");
        assert!(classify(&surface, ClassifyAt::LineStart(0)).contains(&State::Header));
        assert!(classify(&surface, ClassifyAt::LineStart(1)).contains(&State::OrderedList));
        assert!(classify(&surface, ClassifyAt::LineStart(2)).contains(&State::UnorderedList));
        assert!(classify(&surface, ClassifyAt::LineStart(3)).contains(&State::Quote));
        assert!(classify(&surface, ClassifyAt::LineStart(4)).is_empty());
    }

    #[test]
    fn test_classify_column_zero_is_empty() {
        let surface = PlainSurface::from_text("**bold**");
        let set = classify(&surface, ClassifyAt::Position(Position::new(0, 0)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_classify_empty_line_and_past_end() {
        let surface = PlainSurface::from_text("text\n\n");
        assert!(classify(&surface, ClassifyAt::LineStart(1)).is_empty());
        assert!(classify(&surface, ClassifyAt::LineStart(10)).is_empty());
    }
}
