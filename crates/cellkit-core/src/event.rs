#![forbid(unsafe_code)]

//! Input and clipboard event types routed into the cell tree.
//!
//! Every event carries a `consumed` flag. Dispatch walks traits and then
//! ancestors until some handler calls [`Consumable::consume`]; once set,
//! the flag is never cleared and no further handler sees the event.
//!
//! # Design Notes
//!
//! - Key codes and modifiers are plain data and derive `Eq`/`Hash` so they
//!   can be used as shortcut keys.
//! - Clipboard payloads are shared `Rc<dyn ClipboardContent>`; the container
//!   keeps the last copied payload and hands the same `Rc` back on paste.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::clipboard::ClipboardContent;
use crate::geometry::Point;

/// The consume contract shared by all dispatchable events.
pub trait Consumable {
    fn is_consumed(&self) -> bool;

    /// Mark the event handled. Idempotent.
    fn consume(&mut self);
}

macro_rules! impl_consumable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Consumable for $ty {
                #[inline]
                fn is_consumed(&self) -> bool {
                    self.consumed
                }

                #[inline]
                fn consume(&mut self) {
                    self.consumed = true;
                }
            }
        )*
    };
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Space bar. Kept separate from `Char(' ')` so `ctrl+space` is unambiguous.
    Space,
    /// `F(1)` through `F(24)`.
    F(u8),
}

bitflags! {
    /// Held modifier keys. Shortcut matching compares the whole set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        /// Alt, or Option on macOS.
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        /// Super, Meta or Command.
        const SUPER = 1 << 3;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Key press, release or typed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    consumed: bool,
}

impl KeyEvent {
    /// An unconsumed event for `code` with nothing held.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            consumed: false,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// `code` is `Char(c)`; modifiers are ignored.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// A mouse event in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub location: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    consumed: bool,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(location: Point) -> Self {
        Self {
            location,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
            consumed: false,
        }
    }

    #[must_use]
    pub const fn at(x: i32, y: i32) -> Self {
        Self::new(Point::new(x, y))
    }

    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Unconsumed copy of this event, used for synthesized enter/leave events.
    #[must_use]
    pub const fn fresh(&self) -> Self {
        Self {
            location: self.location,
            button: self.button,
            modifiers: self.modifiers,
            consumed: false,
        }
    }
}

/// Focus gained or lost by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusEvent {
    consumed: bool,
}

impl FocusEvent {
    #[must_use]
    pub const fn new() -> Self {
        Self { consumed: false }
    }
}

/// Copy or cut request. The handler that consumes it supplies the payload.
#[derive(Clone, Default)]
pub struct CopyCutEvent {
    cut: bool,
    result: Option<Rc<dyn ClipboardContent>>,
    consumed: bool,
}

impl CopyCutEvent {
    #[must_use]
    pub fn new(cut: bool) -> Self {
        Self {
            cut,
            result: None,
            consumed: false,
        }
    }

    #[must_use]
    pub const fn is_cut(&self) -> bool {
        self.cut
    }

    /// Consume the event and record the payload to place on the clipboard.
    pub fn consume_with(&mut self, content: Rc<dyn ClipboardContent>) {
        self.result = Some(content);
        self.consumed = true;
    }

    #[must_use]
    pub fn result(&self) -> Option<Rc<dyn ClipboardContent>> {
        self.result.clone()
    }
}

impl fmt::Debug for CopyCutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyCutEvent")
            .field("cut", &self.cut)
            .field("result", &self.result)
            .field("consumed", &self.consumed)
            .finish()
    }
}

/// Paste request carrying either cached structured content or host text.
#[derive(Clone)]
pub struct PasteEvent {
    content: Rc<dyn ClipboardContent>,
    consumed: bool,
}

impl PasteEvent {
    #[must_use]
    pub fn new(content: Rc<dyn ClipboardContent>) -> Self {
        Self {
            content,
            consumed: false,
        }
    }

    #[must_use]
    pub fn content(&self) -> &Rc<dyn ClipboardContent> {
        &self.content
    }
}

impl fmt::Debug for PasteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteEvent")
            .field("content", &self.content)
            .field("consumed", &self.consumed)
            .finish()
    }
}

/// Completion request. `menu` is true when a completion menu should open
/// rather than a single unambiguous completion being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionEvent {
    menu: bool,
    consumed: bool,
}

impl CompletionEvent {
    #[must_use]
    pub const fn new(menu: bool) -> Self {
        Self {
            menu,
            consumed: false,
        }
    }

    #[must_use]
    pub const fn is_menu(&self) -> bool {
        self.menu
    }
}

impl_consumable!(
    KeyEvent,
    MouseEvent,
    FocusEvent,
    CopyCutEvent,
    PasteEvent,
    CompletionEvent,
);
