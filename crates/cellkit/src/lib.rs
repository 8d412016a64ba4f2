#![forbid(unsafe_code)]

//! cellkit public facade crate.
//!
//! Re-exports the cell tree and its vocabulary types from the internal
//! crates, plus a prelude for day-to-day use.
//!
//! ```
//! use cellkit::prelude::*;
//!
//! let container = CellContainer::new();
//! let field = Cell::text("name");
//! container.root().children().add(field.clone())?;
//! field.focus()?;
//!
//! let mut key = KeyEvent::new(KeyCode::Char('a'));
//! container.key_pressed(&mut key);
//! assert_eq!(container.focused_cell(), Some(field));
//! # Ok::<(), cellkit::CellError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use cellkit_core::{
    ClipboardContent, Color, CompletionEvent, Consumable, ContentKind, CopyCutEvent, FocusEvent,
    KeyCode, KeyEvent, KeyStroke, KeyStrokeParseError, Modifiers, MouseButton, MouseEvent,
    Observable, PasteEvent, Point, Rect, Subscription, TextContent,
};

// --- Cell tree re-exports --------------------------------------------------

#[cfg(feature = "config-file")]
pub use cellkit_cell::ConfigError;
pub use cellkit_cell::{
    Cell, CellContainer, CellContainerListener, CellContainerPeer, CellError, CellEventSpec,
    CellId, CellKind, CellListener, CellPropertySpec, CellTrait, ChildEvent, Children,
    ContainerConfig, EventKey, Lookup, NullPeer, PropertyChange, PropertyKey, PropertySpec,
    Registration, Result, ShortcutAction, ShortcutConfig, TraitEventSpec, TraitPropertySpec,
    ValueTrait,
};

/// Built-in property specs.
pub mod properties {
    pub use cellkit_cell::popup::{
        BOTTOM_POPUP, FRONT_POPUP, LEFT_POPUP, POPUP, POPUP_SLOTS, RIGHT_POPUP,
    };
    pub use cellkit_cell::properties::*;
}

/// Built-in event specs.
pub mod events {
    pub use cellkit_cell::event_spec::{
        COMPLETE, COPY, CUT, FOCUS_GAINED, FOCUS_LOST, KEY_PRESSED, KEY_RELEASED, KEY_TYPED,
        MOUSE_DRAGGED, MOUSE_ENTERED, MOUSE_LEFT, MOUSE_MOVED, MOUSE_PRESSED, MOUSE_RELEASED,
        PASTE,
    };
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cell, CellContainer, CellError, CellKind, CellTrait, Consumable, KeyCode, KeyEvent,
        Lookup, Modifiers, MouseEvent, Point, PropertyKey, PropertySpec, Rect, Registration,
        Result,
    };

    pub use crate::properties::{FOCUSED, TEXT, VISIBLE};

    pub use crate::{cell, core};
}

pub use cellkit_cell as cell;
pub use cellkit_core as core;
