#![forbid(unsafe_code)]

//! Key strokes: a key code plus an exact modifier set.
//!
//! Strokes have a textual form used by configuration, e.g. `ctrl+c`,
//! `super+shift+z`, `ctrl+space`, `f5`. Modifier names are
//! case-insensitive; `cmd` and `meta` are accepted aliases for `super`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Error returned when a key stroke string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStrokeParseError {
    #[error("empty key stroke")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// A key together with the exact modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyStroke {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A stroke with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// True if `event` has this key and exactly these modifiers.
    ///
    /// Character keys compare case-insensitively so `ctrl+c` also matches
    /// the event a host reports as `ctrl+C`.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.modifiers != event.modifiers {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }

    /// Same key, different modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

fn parse_modifier(name: &str) -> Option<Modifiers> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(Modifiers::CTRL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "super" | "cmd" | "meta" => Some(Modifiers::SUPER),
        _ => None,
    }
}

fn parse_code(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Escape,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Space,
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=24).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

impl FromStr for KeyStroke {
    type Err = KeyStrokeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyStrokeParseError::Empty);
        }
        // `+` and `ctrl++` bind the plus key itself.
        let (head, key) = match s.strip_suffix("++") {
            _ if s == "+" => ("", s),
            Some(head) => (head, "+"),
            None => match s.rsplit_once('+') {
                Some((head, key)) => (head, key),
                None => ("", s),
            },
        };
        let mut modifiers = Modifiers::NONE;
        for part in head.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            modifiers |= parse_modifier(part)
                .ok_or_else(|| KeyStrokeParseError::UnknownModifier(part.to_string()))?;
        }
        let key = key.trim();
        if key.is_empty() {
            return Err(KeyStrokeParseError::Empty);
        }
        let code = parse_code(key).ok_or_else(|| KeyStrokeParseError::UnknownKey(key.to_string()))?;
        Ok(Self::new(code, modifiers))
    }
}

impl TryFrom<String> for KeyStroke {
    type Error = KeyStrokeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyStroke> for String {
    fn from(stroke: KeyStroke) -> Self {
        stroke.to_string()
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "ctrl"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
            (Modifiers::SUPER, "super"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Escape => f.write_str("escape"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Insert => f.write_str("insert"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pageup"),
            KeyCode::PageDown => f.write_str("pagedown"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Space => f.write_str("space"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}
