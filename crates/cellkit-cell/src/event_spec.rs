#![forbid(unsafe_code)]

//! Event specs: identity keys that select which trait hook an event reaches.
//!
//! [`CellEventSpec`] covers the built-in input, focus, clipboard and
//! completion events. Each spec maps to one [`CellTrait`] method (two for
//! key events, which run a low-priority pass over the whole trait stack
//! before the normal pass) and carries a bubbling flag.
//!
//! [`TraitEventSpec`] is the open-ended variant for application events.
//! These reach [`CellTrait::on_trait_event`] and bubble only when the event spec
//! was declared with [`TraitEventSpec::bubbling`].

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use cellkit_core::event::{
    CompletionEvent, Consumable, CopyCutEvent, FocusEvent, KeyEvent, MouseEvent, PasteEvent,
};

use crate::cell::Cell;
use crate::cell_trait::CellTrait;

type Handler<E> = fn(&dyn CellTrait, &Cell, &mut E);

/// Built-in event spec.
pub struct CellEventSpec<E> {
    name: &'static str,
    bubbling: bool,
    low_priority: Option<Handler<E>>,
    handler: Handler<E>,
}

impl<E> CellEventSpec<E> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn is_bubbling(&self) -> bool {
        self.bubbling
    }
}

impl<E: Consumable> CellEventSpec<E> {
    /// Run this event's hooks over one cell's trait stack.
    pub(crate) fn deliver(&self, traits: &[Rc<dyn CellTrait>], cell: &Cell, event: &mut E) {
        if let Some(low_priority) = self.low_priority {
            for behavior in traits {
                if event.is_consumed() {
                    return;
                }
                low_priority(behavior.as_ref(), cell, event);
            }
        }
        for behavior in traits {
            if event.is_consumed() {
                return;
            }
            (self.handler)(behavior.as_ref(), cell, event);
        }
    }
}

impl<E> fmt::Debug for CellEventSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellEventSpec")
            .field("name", &self.name)
            .field("bubbling", &self.bubbling)
            .finish()
    }
}

pub static KEY_PRESSED: CellEventSpec<KeyEvent> = CellEventSpec {
    name: "keyPressed",
    bubbling: true,
    low_priority: Some(|t, cell, e| t.on_key_pressed_low_priority(cell, e)),
    handler: |t, cell, e| t.on_key_pressed(cell, e),
};

pub static KEY_RELEASED: CellEventSpec<KeyEvent> = CellEventSpec {
    name: "keyReleased",
    bubbling: true,
    low_priority: Some(|t, cell, e| t.on_key_released_low_priority(cell, e)),
    handler: |t, cell, e| t.on_key_released(cell, e),
};

pub static KEY_TYPED: CellEventSpec<KeyEvent> = CellEventSpec {
    name: "keyTyped",
    bubbling: true,
    low_priority: Some(|t, cell, e| t.on_key_typed_low_priority(cell, e)),
    handler: |t, cell, e| t.on_key_typed(cell, e),
};

pub static MOUSE_PRESSED: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mousePressed",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_pressed(cell, e),
};

pub static MOUSE_RELEASED: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mouseReleased",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_released(cell, e),
};

pub static MOUSE_MOVED: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mouseMoved",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_moved(cell, e),
};

pub static MOUSE_DRAGGED: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mouseDragged",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_dragged(cell, e),
};

/// Delivered only to the cell the pointer entered.
pub static MOUSE_ENTERED: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mouseEntered",
    bubbling: false,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_entered(cell, e),
};

/// Delivered only to the cell the pointer left.
pub static MOUSE_LEFT: CellEventSpec<MouseEvent> = CellEventSpec {
    name: "mouseLeft",
    bubbling: false,
    low_priority: None,
    handler: |t, cell, e| t.on_mouse_left(cell, e),
};

pub static FOCUS_GAINED: CellEventSpec<FocusEvent> = CellEventSpec {
    name: "focusGained",
    bubbling: false,
    low_priority: None,
    handler: |t, cell, e| t.on_focus_gained(cell, e),
};

pub static FOCUS_LOST: CellEventSpec<FocusEvent> = CellEventSpec {
    name: "focusLost",
    bubbling: false,
    low_priority: None,
    handler: |t, cell, e| t.on_focus_lost(cell, e),
};

pub static COPY: CellEventSpec<CopyCutEvent> = CellEventSpec {
    name: "copy",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_copy(cell, e),
};

pub static CUT: CellEventSpec<CopyCutEvent> = CellEventSpec {
    name: "cut",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_cut(cell, e),
};

pub static PASTE: CellEventSpec<PasteEvent> = CellEventSpec {
    name: "paste",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_paste(cell, e),
};

pub static COMPLETE: CellEventSpec<CompletionEvent> = CellEventSpec {
    name: "complete",
    bubbling: true,
    low_priority: None,
    handler: |t, cell, e| t.on_complete(cell, e),
};

/// Identity of a [`TraitEventSpec`], passed to [`CellTrait::on_trait_event`].
#[derive(Clone, Copy)]
pub struct EventKey {
    addr: *const (),
    name: &'static str,
}

impl EventKey {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is<E>(&self, spec: &'static TraitEventSpec<E>) -> bool {
        std::ptr::eq(self.addr, (spec as *const TraitEventSpec<E>).cast::<()>())
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr, other.addr)
    }
}

impl Eq for EventKey {}

impl fmt::Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKey({})", self.name)
    }
}

/// Application-defined event spec. Declare as a `static`.
///
/// ```
/// use std::any::Any;
/// use cellkit_cell::cell::{Cell, CellKind};
/// use cellkit_cell::cell_trait::CellTrait;
/// use cellkit_cell::event_spec::{EventKey, TraitEventSpec};
/// use cellkit_core::event::{Consumable, FocusEvent};
///
/// static REVALIDATE: TraitEventSpec<FocusEvent> = TraitEventSpec::new("revalidate");
///
/// struct Validator;
///
/// impl CellTrait for Validator {
///     fn on_trait_event(&self, _cell: &Cell, key: EventKey, event: &mut dyn Any) {
///         if let Some(event) = REVALIDATE.accept(key, event) {
///             event.consume();
///         }
///     }
/// }
///
/// let cell = Cell::new(CellKind::Plain);
/// cell.add_trait(Validator);
/// let mut event = FocusEvent::new();
/// cell.dispatch_trait_event(&mut event, &REVALIDATE);
/// assert!(event.is_consumed());
/// ```
pub struct TraitEventSpec<E> {
    name: &'static str,
    bubbling: bool,
    _event: PhantomData<fn() -> E>,
}

impl<E> TraitEventSpec<E> {
    /// A spec delivered only to the target cell.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            bubbling: false,
            _event: PhantomData,
        }
    }

    /// A spec that bubbles to ancestors until consumed.
    pub const fn bubbling(name: &'static str) -> Self {
        Self {
            name,
            bubbling: true,
            _event: PhantomData,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn is_bubbling(&self) -> bool {
        self.bubbling
    }

    #[must_use]
    pub fn key(&'static self) -> EventKey {
        EventKey {
            addr: (self as *const Self).cast::<()>(),
            name: self.name,
        }
    }
}

impl<E: 'static> TraitEventSpec<E> {
    /// The typed event if `key` identifies this spec.
    pub fn accept<'a>(&'static self, key: EventKey, event: &'a mut dyn Any) -> Option<&'a mut E> {
        if key.is(self) {
            event.downcast_mut::<E>()
        } else {
            None
        }
    }
}

impl<E> fmt::Debug for TraitEventSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitEventSpec")
            .field("name", &self.name)
            .field("bubbling", &self.bubbling)
            .finish()
    }
}
