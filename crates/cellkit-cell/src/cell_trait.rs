#![forbid(unsafe_code)]

//! Composable cell behaviors.
//!
//! A [`CellTrait`] is installed on a cell with [`Cell::add_trait`] and is
//! consulted in stack order, most recently installed first:
//!
//! - **Property lookup**: [`CellTrait::get`] answers a [`PropertyKey`] with
//!   a value or passes to the next trait.
//! - **Input events**: the `on_key_*`, `on_mouse_*`, clipboard and
//!   completion hooks may consume the event, which stops both the trait
//!   walk and bubbling to ancestors.
//! - **Structural notifications**: attach/detach, property changes and
//!   child insertion/removal are delivered to every trait of the cell.
//!
//! Every hook has an empty default, so a trait overrides only what it
//! cares about. The same `Rc<dyn CellTrait>` may be installed on many
//! cells; per-cell state belongs in cell properties, not in the trait.
//!
//! [`Cell::add_trait`]: crate::cell::Cell::add_trait

use std::any::Any;

use cellkit_core::event::{
    CompletionEvent, CopyCutEvent, FocusEvent, KeyEvent, MouseEvent, PasteEvent,
};

use crate::cell::Cell;
use crate::children::ChildEvent;
use crate::event_spec::EventKey;
use crate::property::{Lookup, PropertyChange, PropertyKey};

/// A behavior and property provider installed on a cell.
#[allow(unused_variables)]
pub trait CellTrait: 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        "anonymous"
    }

    /// Answer a property lookup, or [`Lookup::Pass`] to defer.
    ///
    /// Every key answered here should also be listed by
    /// [`CellTrait::provided_properties`]; otherwise installing or removing
    /// the trait changes the resolved value without notifying anyone.
    /// Popup slots are never asked.
    fn get(&self, cell: &Cell, key: PropertyKey) -> Lookup {
        Lookup::Pass
    }

    /// Properties whose resolved value this trait may affect.
    ///
    /// When the trait is installed or removed, each listed property is
    /// resolved before and after; a change notification fires for every
    /// property whose resolved value differs. Keys missing from this list
    /// change silently.
    fn provided_properties(&self) -> Vec<PropertyKey> {
        Vec::new()
    }

    /// The cell became part of a container's tree, or the trait was
    /// installed on an attached cell.
    fn on_attach(&self, cell: &Cell) {}

    /// The cell left its container's tree, or the trait was removed from an
    /// attached cell.
    fn on_detach(&self, cell: &Cell) {}

    fn on_property_changed(&self, cell: &Cell, change: &PropertyChange) {}

    fn on_before_child_added(&self, cell: &Cell, event: &ChildEvent) {}

    fn on_child_added(&self, cell: &Cell, event: &ChildEvent) {}

    fn on_before_child_removed(&self, cell: &Cell, event: &ChildEvent) {}

    fn on_child_removed(&self, cell: &Cell, event: &ChildEvent) {}

    /// First pass of key-pressed dispatch on each cell, run over the whole
    /// trait stack before [`CellTrait::on_key_pressed`].
    fn on_key_pressed_low_priority(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_key_pressed(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_key_released_low_priority(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_key_released(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_key_typed_low_priority(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_key_typed(&self, cell: &Cell, event: &mut KeyEvent) {}

    fn on_mouse_pressed(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_mouse_released(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_mouse_moved(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_mouse_dragged(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_mouse_entered(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_mouse_left(&self, cell: &Cell, event: &mut MouseEvent) {}

    fn on_focus_gained(&self, cell: &Cell, event: &mut FocusEvent) {}

    fn on_focus_lost(&self, cell: &Cell, event: &mut FocusEvent) {}

    /// Consume with [`CopyCutEvent::consume_with`] to supply the payload.
    fn on_copy(&self, cell: &Cell, event: &mut CopyCutEvent) {}

    fn on_cut(&self, cell: &Cell, event: &mut CopyCutEvent) {}

    fn on_paste(&self, cell: &Cell, event: &mut PasteEvent) {}

    fn on_complete(&self, cell: &Cell, event: &mut CompletionEvent) {}

    /// Application-defined events; see [`crate::event_spec::TraitEventSpec`].
    fn on_trait_event(&self, cell: &Cell, key: EventKey, event: &mut dyn Any) {}
}

/// A trait built from a property table: answers each listed property with
/// a fixed value. Handy for decorations and tests.
#[derive(Debug, Default)]
pub struct ValueTrait {
    name: &'static str,
    values: Vec<(PropertyKey, Lookup)>,
}

impl ValueTrait {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }

    /// Answer `spec` with `value`.
    #[must_use]
    pub fn with<S: crate::property::PropertySpec>(mut self, spec: &'static S, value: S::Value) -> Self {
        let key = spec.key();
        self.values.retain(|(k, _)| *k != key);
        self.values.push((key, Lookup::of(value)));
        self
    }
}

impl CellTrait for ValueTrait {
    fn name(&self) -> &'static str {
        self.name
    }

    fn get(&self, _cell: &Cell, key: PropertyKey) -> Lookup {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(Lookup::Pass, |(_, value)| value.clone())
    }

    fn provided_properties(&self) -> Vec<PropertyKey> {
        self.values.iter().map(|(k, _)| *k).collect()
    }
}
