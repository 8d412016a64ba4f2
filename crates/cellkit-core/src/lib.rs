#![forbid(unsafe_code)]

//! Core vocabulary for cellkit: geometry, colors, input events, key strokes,
//! clipboard payloads, and observable values.
//!
//! # Role in cellkit
//! `cellkit-core` knows nothing about the cell tree. It defines the data
//! that hosts feed into a `CellContainer` (key, mouse, clipboard events) and
//! the small value types that cell properties carry. The tree itself lives
//! in `cellkit-cell`.

pub mod clipboard;
pub mod color;
pub mod event;
pub mod geometry;
pub mod keystroke;
pub mod observable;

pub use clipboard::{ClipboardContent, ContentKind, TextContent};
pub use color::Color;
pub use event::{
    CompletionEvent, Consumable, CopyCutEvent, FocusEvent, KeyCode, KeyEvent, Modifiers,
    MouseButton, MouseEvent, PasteEvent,
};
pub use geometry::{Point, Rect};
pub use keystroke::{KeyStroke, KeyStrokeParseError};
pub use observable::{Observable, Subscription};
