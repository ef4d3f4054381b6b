//! Markdown style tokenizer for the reference surface.
//!
//! Assigns every char of a line the space-separated style tags a CodeMirror
//! markdown mode would report (`header header-1`, `strong`, `em`,
//! `strikethrough`, `comment`, `quote quote-1`, `variable-2`, `hr`). Inline
//! emphasis and code spans carry across lines until a blank line; fenced code
//! blocks style whole lines as `comment`.
//!
//! Opening and closing markers take the style of the span they delimit, so a
//! lookup just inside a formatted span reports that span's style.

use smol_str::SmolStr;

use crate::types::Position;

/// Style flags for a single char.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Style {
    header: u8,
    quote: u8,
    list: bool,
    hr: bool,
    strong: bool,
    em: bool,
    strike: bool,
    code: bool,
}

impl Style {
    fn code_block() -> Self {
        Self {
            code: true,
            ..Self::default()
        }
    }

    fn tag(&self) -> Option<SmolStr> {
        let mut parts: Vec<String> = Vec::new();
        if self.header > 0 {
            parts.push("header".into());
            parts.push(format!("header-{}", self.header));
        }
        if self.quote > 0 {
            parts.push("quote".into());
            parts.push(format!("quote-{}", self.quote));
        }
        if self.list {
            parts.push("variable-2".into());
        }
        if self.hr {
            parts.push("hr".into());
        }
        if self.strong {
            parts.push("strong".into());
        }
        if self.em {
            parts.push("em".into());
        }
        if self.strike {
            parts.push("strikethrough".into());
        }
        if self.code {
            parts.push("comment".into());
        }
        if parts.is_empty() {
            None
        } else {
            Some(SmolStr::new(parts.join(" ")))
        }
    }
}

/// State carried from one line to the next.
#[derive(Clone, Debug, Default)]
struct TokenizerState {
    /// Open fence marker char and run length.
    fence: Option<(char, usize)>,
    strong: bool,
    em: bool,
    strike: bool,
    /// Backtick run length of the open code span.
    code: Option<usize>,
}

impl TokenizerState {
    fn reset_inline(&mut self) {
        self.strong = false;
        self.em = false;
        self.strike = false;
        self.code = None;
    }

    fn apply(&self, base: Style) -> Style {
        Style {
            strong: self.strong,
            em: self.em,
            strike: self.strike,
            code: self.code.is_some(),
            ..base
        }
    }
}

/// Style tag of the token ending at `pos`, i.e. of the char just before the
/// column.
///
/// Column 0 has no token. Columns past the end of the line are clamped, and a
/// line past the end of the document yields `None`.
pub fn token_type_at<I>(lines: I, pos: Position) -> Option<SmolStr>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut state = TokenizerState::default();
    for (idx, line) in lines.into_iter().enumerate() {
        let styles = style_line(&mut state, line.as_ref());
        if idx < pos.line {
            continue;
        }
        let column = pos.column.min(styles.len());
        if column == 0 {
            return None;
        }
        return styles[column - 1].tag();
    }
    None
}

/// Style tags for every char of every line. Mostly useful for debugging.
pub fn line_tags<I>(lines: I) -> Vec<Vec<Option<SmolStr>>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut state = TokenizerState::default();
    lines
        .into_iter()
        .map(|line| {
            style_line(&mut state, line.as_ref())
                .iter()
                .map(Style::tag)
                .collect()
        })
        .collect()
}

fn style_line(state: &mut TokenizerState, line: &str) -> Vec<Style> {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();

    if let Some((open_char, open_len)) = state.fence {
        if let Some((ch, run, rest_blank)) = fence_marker(&chars) {
            if ch == open_char && run >= open_len && rest_blank {
                state.fence = None;
            }
        }
        return vec![Style::code_block(); n];
    }

    if let Some((ch, run, _)) = fence_marker(&chars) {
        state.fence = Some((ch, run));
        state.reset_inline();
        return vec![Style::code_block(); n];
    }

    if line.trim().is_empty() {
        state.reset_inline();
        return vec![Style::default(); n];
    }

    let mut base = Style::default();
    let mut i = skip_spaces(&chars, 0, 3);

    // Quote markers, possibly nested.
    let mut depth = 0u8;
    while chars.get(i) == Some(&'>') {
        depth = depth.saturating_add(1);
        i += 1;
        i = skip_spaces(&chars, i, usize::MAX);
    }
    base.quote = depth;
    if depth == 0 {
        i = 0;
    }

    let block_start = i;
    let mut inline_start = block_start;
    let content_start = skip_spaces(&chars, block_start, usize::MAX);

    let hashes = run_len(&chars, content_start, '#');
    let after_hashes = chars.get(content_start + hashes);
    if (1..=6).contains(&hashes) && after_hashes.is_none_or(|c| c.is_whitespace()) {
        base.header = hashes as u8;
        inline_start = content_start + hashes;
    } else if is_rule(&chars[block_start..]) {
        base.hr = true;
        return vec![state.apply(base); n];
    } else if let Some(marker_end) = list_marker_end(&chars, content_start) {
        base.list = true;
        inline_start = marker_end;
    }

    let mut styles = vec![base; inline_start];
    style_inline(state, base, &chars[inline_start..], &mut styles);
    styles
}

fn style_inline(state: &mut TokenizerState, base: Style, chars: &[char], out: &mut Vec<Style>) {
    let n = chars.len();
    let mut i = 0;
    while i < n {
        let c = chars[i];

        if let Some(open_len) = state.code {
            if c == '`' {
                let run = run_len(chars, i, '`');
                push_run(out, state.apply(base), run);
                if run == open_len {
                    state.code = None;
                }
                i += run;
            } else {
                out.push(state.apply(base));
                i += 1;
            }
            continue;
        }

        match c {
            '\\' if i + 1 < n => {
                push_run(out, state.apply(base), 2);
                i += 2;
            }
            '`' => {
                let run = run_len(chars, i, '`');
                state.code = Some(run);
                push_run(out, state.apply(base), run);
                i += run;
            }
            '*' | '_' | '~' => {
                let run = run_len(chars, i, c);
                let prev = if i == 0 { None } else { Some(chars[i - 1]) };
                let next = chars.get(i + run).copied();
                let can_open = next.is_some_and(|ch| !ch.is_whitespace());
                let can_close = prev.is_some_and(|ch| !ch.is_whitespace());
                let intraword = c == '_'
                    && prev.is_some_and(char::is_alphanumeric)
                    && next.is_some_and(char::is_alphanumeric);

                let toggle = if intraword {
                    None
                } else {
                    delimiter_toggle(state, c, run, can_open, can_close)
                };

                match toggle {
                    Some(Toggle::Open(flags)) => {
                        flags.set(state, true);
                        push_run(out, state.apply(base), run);
                    }
                    Some(Toggle::Close(flags)) => {
                        push_run(out, state.apply(base), run);
                        flags.set(state, false);
                    }
                    None => push_run(out, state.apply(base), run),
                }
                i += run;
            }
            _ => {
                out.push(state.apply(base));
                i += 1;
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Flags {
    strong: bool,
    em: bool,
    strike: bool,
}

impl Flags {
    fn set(self, state: &mut TokenizerState, on: bool) {
        if self.strong {
            state.strong = on;
        }
        if self.em {
            state.em = on;
        }
        if self.strike {
            state.strike = on;
        }
    }

    fn any_on(self, state: &TokenizerState) -> bool {
        (self.strong && state.strong) || (self.em && state.em) || (self.strike && state.strike)
    }
}

enum Toggle {
    Open(Flags),
    Close(Flags),
}

fn delimiter_toggle(
    state: &TokenizerState,
    c: char,
    run: usize,
    can_open: bool,
    can_close: bool,
) -> Option<Toggle> {
    let flags = match (c, run) {
        ('~', 1) => return None,
        ('~', _) => Flags {
            strong: false,
            em: false,
            strike: true,
        },
        (_, 1) => Flags {
            strong: false,
            em: true,
            strike: false,
        },
        (_, 2) => Flags {
            strong: true,
            em: false,
            strike: false,
        },
        _ => Flags {
            strong: true,
            em: true,
            strike: false,
        },
    };

    if flags.any_on(state) {
        can_close.then_some(Toggle::Close(flags))
    } else {
        can_open.then_some(Toggle::Open(flags))
    }
}

fn push_run(out: &mut Vec<Style>, style: Style, run: usize) {
    out.extend(std::iter::repeat_n(style, run));
}

fn run_len(chars: &[char], start: usize, c: char) -> usize {
    chars.iter().skip(start).take_while(|&&ch| ch == c).count()
}

fn skip_spaces(chars: &[char], start: usize, max: usize) -> usize {
    let spaces = chars
        .iter()
        .skip(start)
        .take_while(|&&ch| ch == ' ' || ch == '\t')
        .take(max)
        .count();
    start + spaces
}

/// Fence open/close marker: the marker char, its run length and whether the
/// rest of the line is blank.
fn fence_marker(chars: &[char]) -> Option<(char, usize, bool)> {
    let start = skip_spaces(chars, 0, usize::MAX);
    if start > 3 {
        return None;
    }
    let ch = *chars.get(start)?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = run_len(chars, start, ch);
    if run < 3 {
        return None;
    }
    let rest_blank = chars[start + run..].iter().all(|c| c.is_whitespace());
    Some((ch, run, rest_blank))
}

/// A thematic break: three or more of the same `-`, `*` or `_`, optionally
/// separated by whitespace.
fn is_rule(chars: &[char]) -> bool {
    let mut marker = None;
    let mut count = 0;
    for &c in chars {
        if c.is_whitespace() {
            continue;
        }
        match marker {
            None if matches!(c, '-' | '*' | '_') => marker = Some(c),
            Some(m) if m == c => {}
            _ => return false,
        }
        count += 1;
    }
    count >= 3
}

/// Index just past a list marker and its trailing whitespace.
fn list_marker_end(chars: &[char], start: usize) -> Option<usize> {
    let first = *chars.get(start)?;
    let marker_end = if matches!(first, '*' | '+' | '-') {
        start + 1
    } else if first.is_ascii_digit() {
        let digits = chars[start..].iter().take_while(|c| c.is_ascii_digit()).count();
        match chars.get(start + digits) {
            Some('.') | Some(')') => start + digits + 1,
            _ => return None,
        }
    } else {
        return None;
    };

    match chars.get(marker_end) {
        Some(c) if c.is_whitespace() => Some(skip_spaces(chars, marker_end, usize::MAX)),
        _ => None,
    }
}
