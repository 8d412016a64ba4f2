#![forbid(unsafe_code)]

//! The ordered child list of a cell.
//!
//! [`Children`] is a live view: every read goes to the owning cell and
//! every write runs the full insertion or removal protocol.
//!
//! # Insertion
//!
//! 1. Validate (index, parentless, detached, no cycle).
//! 2. Fire `before_child_added` on the owner's traits and on container
//!    listeners.
//! 3. Wire the parent link and both sibling links, then insert.
//! 4. Attach the child's subtree if the owner is attached.
//! 5. Fire `child_added` on traits, cell listeners and container listeners.
//!
//! # Removal
//!
//! The mirror image, with one extra step: if the focused cell lies in the
//! removed subtree, focus is cleared before the subtree is detached.

use tracing::debug;

use crate::cell::Cell;
use crate::error::{CellError, Result};

/// Payload of child insertion and removal notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEvent {
    /// Position of the child at the time of the change.
    pub index: usize,
    pub child: Cell,
}

/// Live view of a cell's children.
#[derive(Debug, Clone, Copy)]
pub struct Children<'a> {
    owner: &'a Cell,
}

impl<'a> Children<'a> {
    pub(crate) fn new(owner: &'a Cell) -> Self {
        Self { owner }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owner.inner().children.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.owner.inner().children.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn first(&self) -> Option<Cell> {
        self.owner.inner().children.borrow().first().cloned()
    }

    #[must_use]
    pub fn last(&self) -> Option<Cell> {
        self.owner.inner().children.borrow().last().cloned()
    }

    #[must_use]
    pub fn index_of(&self, child: &Cell) -> Option<usize> {
        self.owner
            .inner()
            .children
            .borrow()
            .iter()
            .position(|c| c == child)
    }

    /// Iterate over a snapshot of the children.
    ///
    /// The snapshot is taken up front, so handlers may mutate the list
    /// while the iterator is alive.
    pub fn iter(&self) -> std::vec::IntoIter<Cell> {
        self.to_vec().into_iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Cell> {
        self.owner.inner().children.borrow().clone()
    }

    /// Append `child`.
    pub fn add(&self, child: Cell) -> Result<()> {
        self.insert(self.len(), child)
    }

    /// Insert `child` at `index`, attaching it if the owner is attached.
    pub fn insert(&self, index: usize, child: Cell) -> Result<()> {
        let owner = self.owner;
        self.check_insert(index, &child)?;

        let event = ChildEvent {
            index,
            child: child.clone(),
        };
        owner.fire_before_child_added(&event);
        // Handlers may have changed the list.
        self.check_insert(index, &child)?;

        {
            let inner = owner.inner();
            let mut children = inner.children.borrow_mut();
            let prev = index.checked_sub(1).and_then(|i| children.get(i)).cloned();
            let next = children.get(index).cloned();
            child.link(Some(owner), prev.as_ref(), next.as_ref());
            if let Some(prev) = &prev {
                prev.set_next_sibling(Some(&child));
            }
            if let Some(next) = &next {
                next.set_prev_sibling(Some(&child));
            }
            children.insert(index, child.clone());
        }

        if let Some(container) = owner.container() {
            child.attach(&container);
        }
        debug!(parent = %owner, child = %child, index, "child added");
        owner.fire_child_added(&event);
        Ok(())
    }

    fn check_insert(&self, index: usize, child: &Cell) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(CellError::IndexOutOfBounds { index, len });
        }
        if child.parent().is_some() {
            return Err(CellError::AlreadyHasParent {
                cell: child.to_string(),
            });
        }
        if child.is_attached() {
            return Err(CellError::AlreadyAttached {
                cell: child.to_string(),
            });
        }
        if self.owner.is_descendant_of(child) {
            return Err(CellError::WouldCreateCycle {
                cell: child.to_string(),
            });
        }
        Ok(())
    }

    /// Remove the child at `index`. Out-of-range indices are a no-op.
    ///
    /// Fails only if focus has to be cleared while a focus change is
    /// already in progress.
    pub fn remove(&self, index: usize) -> Result<Option<Cell>> {
        let owner = self.owner;
        let Some(child) = self.get(index) else {
            return Ok(None);
        };

        // Focus is cleared before anyone hears about the removal, so a
        // failure leaves listeners with nothing to roll back.
        if let Some(container) = child.container() {
            container.clear_focus_within(&child)?;
        }

        let event = ChildEvent {
            index,
            child: child.clone(),
        };
        owner.fire_before_child_removed(&event);

        // A before-removal handler may have focused into the subtree.
        if let Some(container) = child.container() {
            container.clear_focus_within(&child)?;
        }
        if child.is_attached() {
            child.detach();
        }

        {
            let inner = owner.inner();
            let mut children = inner.children.borrow_mut();
            let Some(position) = children.iter().position(|c| *c == child) else {
                return Ok(None);
            };
            children.remove(position);
            let prev = position.checked_sub(1).and_then(|i| children.get(i));
            let next = children.get(position);
            if let Some(prev) = prev {
                prev.set_next_sibling(next);
            }
            if let Some(next) = next {
                next.set_prev_sibling(prev);
            }
        }
        child.unlink();

        debug!(parent = %owner, child = %child, index, "child removed");
        owner.fire_child_removed(&event);
        Ok(Some(child))
    }

    /// Remove `child` if it is in this list. Returns whether it was.
    pub fn remove_cell(&self, child: &Cell) -> Result<bool> {
        match self.index_of(child) {
            Some(index) => Ok(self.remove(index)?.is_some()),
            None => Ok(false),
        }
    }

    /// Remove every child, last first.
    pub fn clear(&self) -> Result<()> {
        while let Some(last) = self.len().checked_sub(1) {
            self.remove(last)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for Children<'a> {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
