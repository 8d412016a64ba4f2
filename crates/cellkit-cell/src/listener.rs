#![forbid(unsafe_code)]

//! Observers of tree mutation.
//!
//! Property and structure notifications reach observers in a fixed order:
//! the cell's traits, then its direct [`CellListener`]s, then the
//! [`CellContainerListener`]s of the container it is attached to.

use crate::cell::Cell;
use crate::children::ChildEvent;
use crate::property::PropertyChange;

/// Container-wide hook surface for undo recording, decoration and other
/// layered subsystems.
#[allow(unused_variables)]
pub trait CellContainerListener {
    /// Start of the outermost command.
    fn on_before_command(&self) {}

    /// End of the outermost command. Runs even if the command panicked.
    fn on_after_command(&self) {}

    fn on_cell_property_changed(&self, cell: &Cell, change: &PropertyChange) {}

    fn on_before_child_added(&self, parent: &Cell, event: &ChildEvent) {}

    fn on_child_added(&self, parent: &Cell, event: &ChildEvent) {}

    fn on_before_child_removed(&self, parent: &Cell, event: &ChildEvent) {}

    fn on_child_removed(&self, parent: &Cell, event: &ChildEvent) {}
}

/// Listener installed on a single cell with [`Cell::add_listener`].
#[allow(unused_variables)]
pub trait CellListener {
    fn on_property_changed(&self, cell: &Cell, change: &PropertyChange) {}

    fn on_child_added(&self, cell: &Cell, event: &ChildEvent) {}

    fn on_child_removed(&self, cell: &Cell, event: &ChildEvent) {}
}

/// Adapts a closure to [`CellListener`] for property changes only.
pub(crate) struct PropertyListenerFn<F>(pub(crate) F);

impl<F: Fn(&Cell, &PropertyChange)> CellListener for PropertyListenerFn<F> {
    fn on_property_changed(&self, cell: &Cell, change: &PropertyChange) {
        (self.0)(cell, change);
    }
}
