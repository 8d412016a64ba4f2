#![forbid(unsafe_code)]

//! Popups anchored to a cell in one of four directional slots.
//!
//! A popup is parented to its owner but is not one of its children: it is
//! skipped by child iteration and sibling navigation, yet it follows the
//! owner through attach and detach and counts as a descendant for
//! containment queries. Writing a slot rewires the old and new popups
//! before the property change is published, so observers always see a
//! consistent attach state.

use std::any::Any;

use crate::cell::Cell;
use crate::container::CellContainer;
use crate::error::{CellError, Result, fatal};
use crate::property::{CellPropertySpec, PropertyKey};
use crate::registration::Registration;

/// Set on a cell while it occupies a popup slot.
pub static POPUP: CellPropertySpec<bool> = CellPropertySpec::new("popup", |_| false);

pub static LEFT_POPUP: CellPropertySpec<Option<Cell>> =
    CellPropertySpec::new("leftPopup", |_| None);

pub static RIGHT_POPUP: CellPropertySpec<Option<Cell>> =
    CellPropertySpec::new("rightPopup", |_| None);

pub static BOTTOM_POPUP: CellPropertySpec<Option<Cell>> =
    CellPropertySpec::new("bottomPopup", |_| None);

pub static FRONT_POPUP: CellPropertySpec<Option<Cell>> =
    CellPropertySpec::new("frontPopup", |_| None);

/// All popup slots, in attach order.
pub static POPUP_SLOTS: [&CellPropertySpec<Option<Cell>>; 4] =
    [&LEFT_POPUP, &RIGHT_POPUP, &BOTTOM_POPUP, &FRONT_POPUP];

pub(crate) fn is_slot(key: PropertyKey) -> bool {
    POPUP_SLOTS.iter().any(|slot| key.is(*slot))
}

/// The popup cell inside a slot value, if `value` is a slot value at all.
pub(crate) fn slot_cell<T: Any>(value: &T) -> Option<Cell> {
    (value as &dyn Any)
        .downcast_ref::<Option<Cell>>()
        .cloned()
        .flatten()
}

/// Move popup ownership from `old` to `new` on `owner`.
///
/// Runs before the slot write is committed. A `new` popup that already has
/// a parent or container is a fatal usage error; [`Cell::set_popup`]
/// checks the same conditions up front and reports them as `Err`.
pub(crate) fn rewire(owner: &Cell, old: Option<&Cell>, new: Option<&Cell>) {
    if let Some(old) = old {
        if let Some(container) = old.container() {
            if let Err(err) = container.clear_focus_within(old) {
                fatal(err);
            }
            old.detach();
        }
        old.set(&POPUP, false);
        old.set_parent(None);
    }
    if let Some(new) = new {
        if let Err(err) = check_new_popup(owner, new) {
            fatal(err);
        }
        new.set_parent(Some(owner));
        new.set(&POPUP, true);
        if let Some(container) = owner.container() {
            new.attach(&container);
        }
    }
}

fn check_new_popup(owner: &Cell, popup: &Cell) -> Result<()> {
    if popup.parent().is_some() {
        return Err(CellError::AlreadyHasParent {
            cell: popup.to_string(),
        });
    }
    if popup.is_attached() {
        return Err(CellError::AlreadyAttached {
            cell: popup.to_string(),
        });
    }
    if owner.is_descendant_of(popup) {
        return Err(CellError::WouldCreateCycle {
            cell: popup.to_string(),
        });
    }
    Ok(())
}

impl Cell {
    /// Put `popup` into `slot`, or empty the slot with `None`.
    ///
    /// Unlike the generic [`Cell::set`], contract violations are returned
    /// instead of panicking.
    pub fn set_popup(
        &self,
        slot: &'static CellPropertySpec<Option<Cell>>,
        popup: Option<Cell>,
    ) -> Result<Registration> {
        if let Some(popup) = &popup
            && self.get(slot).as_ref() != Some(popup)
        {
            check_new_popup(self, popup)?;
        }
        if let Some(old) = self.get(slot)
            && let Some(container) = old.container()
            && container.is_changing_focus()
            && container.focused_cell().is_some_and(|f| f.is_descendant_of(&old))
        {
            return Err(CellError::ReentrantFocusChange);
        }
        Ok(self.set(slot, popup))
    }

    /// Cells currently held in this cell's popup slots.
    #[must_use]
    pub fn popups(&self) -> Vec<Cell> {
        POPUP_SLOTS
            .iter()
            .filter_map(|slot| self.get(*slot))
            .collect()
    }

    #[must_use]
    pub fn is_popup(&self) -> bool {
        self.get(&POPUP)
    }

    /// The slot of its owner that holds this popup.
    #[must_use]
    pub fn popup_slot(&self) -> Option<&'static CellPropertySpec<Option<Cell>>> {
        let owner = self.parent()?;
        POPUP_SLOTS
            .iter()
            .copied()
            .find(|slot| owner.get(*slot).as_ref() == Some(self))
    }
}

impl CellContainer {
    /// Popups currently attached to this container, oldest first.
    #[must_use]
    pub fn popups(&self) -> Vec<Cell> {
        self.inner().popups.borrow().clone()
    }

    pub(crate) fn register_popup(&self, popup: &Cell) {
        let mut popups = self.inner().popups.borrow_mut();
        if !popups.contains(popup) {
            popups.push(popup.clone());
        }
    }

    pub(crate) fn unregister_popup(&self, popup: &Cell) {
        self.inner().popups.borrow_mut().retain(|p| p != popup);
    }
}
