//! Keyboard input types and shortcut parsing.
//!
//! Shortcuts are written the way CodeMirror key maps name them: modifiers
//! joined to the key with `-`, e.g. `Cmd-B`, `Cmd-Alt-L`, `Shift-Tab`, `F9`.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::error::ToolbarError;

/// A physical key as hosts report it. Character keys are stored lowercase so
/// `Cmd-B` and `Cmd-b` name the same shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(SmolStr),
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key F1-F24.
    F(u8),
}

impl Key {
    pub fn character(s: impl AsRef<str>) -> Self {
        Self::Character(SmolStr::new(s.as_ref().to_lowercase()))
    }

    /// Caret movement keys, left to the host.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }
}

impl FromStr for Key {
    type Err = ToolbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            "Esc" | "Escape" => Key::Escape,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Space" => Key::Space,
            "Left" => Key::ArrowLeft,
            "Right" => Key::ArrowRight,
            "Up" => Key::ArrowUp,
            "Down" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            _ => {
                if let Some(n) = s
                    .strip_prefix('F')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=24).contains(n))
                {
                    Key::F(n)
                } else if s.chars().count() == 1 {
                    Key::character(s)
                } else {
                    return Err(ToolbarError::InvalidShortcut(s.to_string()));
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Character(c) => f.write_str(&c.to_uppercase()),
            Key::Tab => f.write_str("Tab"),
            Key::Enter => f.write_str("Enter"),
            Key::Escape => f.write_str("Esc"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Delete => f.write_str("Delete"),
            Key::Space => f.write_str("Space"),
            Key::ArrowLeft => f.write_str("Left"),
            Key::ArrowRight => f.write_str("Right"),
            Key::ArrowUp => f.write_str("Up"),
            Key::ArrowDown => f.write_str("Down"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PageUp"),
            Key::PageDown => f.write_str("PageDown"),
            Key::F(n) => write!(f, "F{n}"),
        }
    }
}

/// Held modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Cmd on Mac.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };
}

/// A key plus modifiers, as bound to a toolbar action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::META,
        }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }
}

impl FromStr for KeyCombo {
    type Err = ToolbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolbarError::InvalidShortcut(s.to_string());
        // A trailing "-" is the minus key itself, e.g. "Cmd--".
        let (mods, key) = match s.strip_suffix("--") {
            Some(mods) => (mods, "-"),
            None => match s.rsplit_once('-') {
                Some((mods, key)) => (mods, key),
                None => ("", s),
            },
        };
        if key.is_empty() {
            return Err(invalid());
        }

        let mut modifiers = Modifiers::NONE;
        for part in mods.split('-').filter(|p| !p.is_empty()) {
            match part {
                "Cmd" | "Meta" => modifiers.meta = true,
                "Ctrl" => modifiers.ctrl = true,
                "Alt" => modifiers.alt = true,
                "Shift" => modifiers.shift = true,
                _ => return Err(invalid()),
            }
        }

        Ok(Self {
            key: key.parse().map_err(|_| invalid())?,
            modifiers,
        })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.shift {
            f.write_str("Shift-")?;
        }
        if self.modifiers.meta {
            f.write_str("Cmd-")?;
        }
        if self.modifiers.ctrl {
            f.write_str("Ctrl-")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt-")?;
        }
        self.key.fmt(f)
    }
}

/// Rewrite `Cmd` to `Ctrl` in a shortcut string on non-Mac platforms.
pub fn convert_shortcut(shortcut: &str, is_mac: bool) -> String {
    if is_mac {
        shortcut.to_string()
    } else {
        shortcut.replace("Cmd", "Ctrl")
    }
}

/// What the editor did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Consumed; the host should suppress its default.
    Handled,
    /// Not bound here.
    NotHandled,
    /// Recognized but left to the host, e.g. arrows or Escape outside fullscreen.
    PassThrough,
}
