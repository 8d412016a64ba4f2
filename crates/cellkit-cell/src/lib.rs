#![forbid(unsafe_code)]

//! The cell tree: nodes with typed properties, stacked traits, popups,
//! focus, and a container that routes host input into the tree.
//!
//! # Role in cellkit
//! Everything an editor builds (text editing, completion, decorations,
//! navigation) is a [`CellTrait`] or a property spec installed on cells
//! from this crate. Rendering is somebody else's job: a
//! [`CellContainerPeer`] supplies geometry and hit-testing.
//!
//! # Example
//!
//! ```
//! use cellkit_cell::{Cell, CellContainer, FOCUSED, TEXT};
//!
//! let container = CellContainer::new();
//! let name = Cell::text("x");
//! container.root().children().add(name.clone()).unwrap();
//!
//! name.focus().unwrap();
//! assert!(name.get(&FOCUSED));
//! assert_eq!(name.get(&TEXT), "x");
//! ```

pub mod cell;
pub mod cell_trait;
pub mod children;
pub mod config;
pub mod container;
pub mod error;
pub mod event_spec;
pub mod listener;
pub mod peer;
pub mod popup;
pub mod properties;
pub mod property;
pub mod registration;

pub use cell::{Cell, CellId, CellKind};
pub use cell_trait::{CellTrait, ValueTrait};
pub use children::{ChildEvent, Children};
#[cfg(feature = "config-file")]
pub use config::ConfigError;
pub use config::{ContainerConfig, ShortcutAction, ShortcutConfig};
pub use container::CellContainer;
pub use error::{CellError, Result};
pub use event_spec::{
    COMPLETE, COPY, CUT, CellEventSpec, EventKey, FOCUS_GAINED, FOCUS_LOST, KEY_PRESSED,
    KEY_RELEASED, KEY_TYPED, MOUSE_DRAGGED, MOUSE_ENTERED, MOUSE_LEFT, MOUSE_MOVED, MOUSE_PRESSED,
    MOUSE_RELEASED, PASTE, TraitEventSpec,
};
pub use listener::{CellContainerListener, CellListener};
pub use peer::{CellContainerPeer, NullPeer};
pub use popup::{BOTTOM_POPUP, FRONT_POPUP, LEFT_POPUP, POPUP, POPUP_SLOTS, RIGHT_POPUP};
pub use properties::{
    BACKGROUND, BOLD, BORDER_COLOR, CARET_POSITION, CARET_VISIBLE, FOCUS_HIGHLIGHTED, FOCUSABLE,
    FOCUSED, HAS_SHADOW, IMAGE, MAX_DIMENSION, SELECTED, SELECTION_START, SELECTION_VISIBLE, TEXT,
    TEXT_COLOR, VISIBLE,
};
pub use property::{
    AnyValue, CellPropertySpec, Lookup, PropertyChange, PropertyKey, PropertySpec, PropertyType,
    TraitPropertySpec, Value,
};
pub use registration::Registration;
