#![forbid(unsafe_code)]

//! The cell: a tree node with properties, a trait stack and children.
//!
//! # Design
//!
//! A [`Cell`] is a cheap handle (`Rc`) to shared node state. Ownership
//! flows downward: a cell owns its children, and its popups through its
//! property map. Every upward or sideways link (parent, siblings,
//! container) is a `Weak` that is cleared when the link is severed, so a
//! stale handle reads as "no parent" rather than dangling.
//!
//! # Property resolution
//!
//! `get` answers from, in order:
//!
//! 1. the explicit entry in the sparse property map (cell properties only),
//! 2. the first trait on the stack that does not [`Lookup::Pass`],
//! 3. the property spec's default, computed from the cell.
//!
//! `set` keeps the map sparse: writing the value the cell would resolve
//! without an entry removes the entry instead.
//!
//! # Notification order
//!
//! Property changes reach the cell's traits, then its direct listeners,
//! then the listeners of the container it is attached to.
//!
//! # Reentrancy
//!
//! No `RefCell` borrow is held while traits, listeners or the peer run.
//! Trait and listener lists are snapshotted before each walk.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use cellkit_core::event::Consumable;
use cellkit_core::geometry::{Point, Rect};
use tracing::{debug, trace, warn};

use crate::cell_trait::CellTrait;
use crate::children::{ChildEvent, Children};
use crate::container::{CellContainer, ContainerInner};
use crate::error::{CellError, Result};
use crate::event_spec::{CellEventSpec, TraitEventSpec};
use crate::listener::{CellListener, PropertyListenerFn};
use crate::popup;
use crate::properties::{FOCUSABLE, FOCUSED, TEXT, VISIBLE};
use crate::property::{
    CellPropertySpec, Lookup, PropertyChange, PropertyKey, PropertySpec, PropertyType, Value,
    decode,
};
use crate::registration::Registration;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// Installation ids for traits and listeners.
static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

fn next_entry_id() -> u64 {
    NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Unique, process-wide identifier of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural kind of a cell. Kinds only select property defaults; all
/// behavior comes from traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Plain,
    Text,
    Horizontal,
    Vertical,
    Scroll,
    Image,
}

struct TraitEntry {
    id: u64,
    behavior: Rc<dyn CellTrait>,
}

pub(crate) struct CellInner {
    id: CellId,
    kind: CellKind,
    /// Most recently installed first.
    traits: RefCell<Vec<TraitEntry>>,
    properties: RefCell<AHashMap<PropertyKey, Value>>,
    pub(crate) children: RefCell<Vec<Cell>>,
    parent: RefCell<Weak<CellInner>>,
    prev_sibling: RefCell<Weak<CellInner>>,
    next_sibling: RefCell<Weak<CellInner>>,
    container: RefCell<Weak<ContainerInner>>,
    listeners: RefCell<Vec<(u64, Rc<dyn CellListener>)>>,
}

/// Handle to a node of the cell tree. Clones share the node.
#[derive(Clone)]
pub struct Cell {
    inner: Rc<CellInner>,
}

fn upgrade(link: &RefCell<Weak<CellInner>>) -> Option<Cell> {
    link.borrow().upgrade().map(|inner| Cell { inner })
}

fn downgrade(cell: Option<&Cell>) -> Weak<CellInner> {
    cell.map_or_else(Weak::new, |c| Rc::downgrade(&c.inner))
}

impl Cell {
    /// A detached cell with no traits, children or explicit properties.
    #[must_use]
    pub fn new(kind: CellKind) -> Self {
        Self {
            inner: Rc::new(CellInner {
                id: CellId(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed)),
                kind,
                traits: RefCell::new(Vec::new()),
                properties: RefCell::new(AHashMap::new()),
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
                prev_sibling: RefCell::new(Weak::new()),
                next_sibling: RefCell::new(Weak::new()),
                container: RefCell::new(Weak::new()),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A text cell holding `text`.
    pub fn text(text: impl Into<String>) -> Self {
        let cell = Self::new(CellKind::Text);
        cell.set(&TEXT, text.into());
        cell
    }

    #[must_use]
    pub fn id(&self) -> CellId {
        self.inner.id
    }

    #[must_use]
    pub fn kind(&self) -> CellKind {
        self.inner.kind
    }

    pub(crate) fn inner(&self) -> &CellInner {
        &self.inner
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Resolved value of `spec` on this cell.
    pub fn get<S: PropertySpec>(&self, spec: &'static S) -> S::Value {
        let key = spec.key();
        decode::<S::Value>(key, &self.get_erased(key)).unwrap_or_else(|| spec.default_for(self))
    }

    /// Resolved value of `key`, type-erased.
    #[must_use]
    pub fn get_erased(&self, key: PropertyKey) -> Value {
        if key.is_stored() {
            let explicit = self.inner.properties.borrow().get(&key).cloned();
            if let Some(value) = explicit {
                return value;
            }
        }
        self.resolve_fallback(key)
    }

    /// True if `spec` has an explicit entry in this cell's property map.
    #[must_use]
    pub fn has_explicit<T: PropertyType>(&self, spec: &'static CellPropertySpec<T>) -> bool {
        self.inner.properties.borrow().contains_key(&spec.key())
    }

    /// The value `key` resolves to when the cell holds no explicit entry.
    ///
    /// Popup slots skip the trait stack: a popup exists only once a slot
    /// write has parented and attached it.
    fn resolve_fallback(&self, key: PropertyKey) -> Value {
        let default = key.default_value(self);
        if popup::is_slot(key) {
            return default;
        }
        for behavior in self.trait_snapshot() {
            match behavior.get(self, key) {
                Lookup::Pass => {}
                Lookup::Value(value) if same_type(&value, &default) => return value,
                Lookup::Value(value) => warn!(
                    cell = %self,
                    property = key.name(),
                    trait_name = behavior.name(),
                    found = ?value,
                    "trait answered a property with the wrong type; ignoring it"
                ),
            }
        }
        default
    }

    /// Write `value`, returning a token that writes the previous value back.
    ///
    /// Writing the current value is a no-op that returns an empty token.
    /// Writing a popup slot rewires the old and new popups before the
    /// change is published; a new popup that already has a parent or is
    /// attached elsewhere is a fatal usage error (see [`Cell::set_popup`]).
    pub fn set<T: PropertyType>(&self, spec: &'static CellPropertySpec<T>, value: T) -> Registration {
        let key = spec.key();
        let old: T = self.get(spec);
        if old == value {
            return Registration::empty();
        }

        if popup::is_slot(key) {
            let old_popup = popup::slot_cell(&old);
            let new_popup = popup::slot_cell(&value);
            popup::rewire(self, old_popup.as_ref(), new_popup.as_ref());
        }

        let new: Value = Rc::new(value);
        self.store(key, Rc::clone(&new));
        let change = PropertyChange::new(key, Rc::new(old.clone()), new);
        self.fire_property_changed(&change);

        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                Cell { inner }.set(spec, old);
            }
        })
    }

    /// Drop the explicit entry for `spec`, falling back to the trait stack
    /// and default. Fires a change only if the resolved value changes.
    pub fn clear<T: PropertyType>(&self, spec: &'static CellPropertySpec<T>) -> Registration {
        let key = spec.key();
        if !self.has_explicit(spec) {
            return Registration::empty();
        }
        let fallback = decode::<T>(key, &self.resolve_fallback(key))
            .unwrap_or_else(|| spec.default_for(self));
        if self.get(spec) == fallback {
            self.inner.properties.borrow_mut().remove(&key);
            return Registration::empty();
        }
        self.set(spec, fallback)
    }

    fn store(&self, key: PropertyKey, value: Value) {
        let fallback = self.resolve_fallback(key);
        let mut properties = self.inner.properties.borrow_mut();
        if fallback.eq_value(&*value) {
            properties.remove(&key);
        } else {
            properties.insert(key, value);
        }
    }

    pub(crate) fn fire_property_changed(&self, change: &PropertyChange) {
        trace!(cell = %self, property = change.key().name(), "property changed");
        for behavior in self.trait_snapshot() {
            behavior.on_property_changed(self, change);
        }
        for listener in self.listener_snapshot() {
            listener.on_property_changed(self, change);
        }
        if let Some(container) = self.container() {
            container.fire_cell_property_changed(self, change);
        }
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.get(&VISIBLE)
    }

    #[must_use]
    pub fn focusable(&self) -> bool {
        self.get(&FOCUSABLE)
    }

    #[must_use]
    pub fn focused(&self) -> bool {
        self.get(&FOCUSED)
    }

    /// Contents of a text cell.
    #[must_use]
    pub fn text_value(&self) -> String {
        self.get(&TEXT)
    }

    /// Visible itself and through every ancestor, popup owners included.
    #[must_use]
    pub fn is_effectively_visible(&self) -> bool {
        self.visible() && self.ancestors().all(|a| a.visible())
    }

    // -----------------------------------------------------------------------
    // Traits and listeners
    // -----------------------------------------------------------------------

    /// Install `behavior` on top of the trait stack.
    pub fn add_trait(&self, behavior: impl CellTrait) -> Registration {
        self.add_trait_rc(Rc::new(behavior))
    }

    /// Install a shared trait on top of the trait stack.
    ///
    /// Every property the trait provides is resolved before and after the
    /// install; one change fires for each property whose value moved.
    pub fn add_trait_rc(&self, behavior: Rc<dyn CellTrait>) -> Registration {
        let id = next_entry_id();
        let before = self.snapshot_values(&behavior.provided_properties());
        self.inner.traits.borrow_mut().insert(
            0,
            TraitEntry {
                id,
                behavior: Rc::clone(&behavior),
            },
        );
        trace!(cell = %self, trait_name = behavior.name(), "trait added");
        if self.is_attached() {
            behavior.on_attach(self);
        }
        self.refire(before);

        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                Cell { inner }.remove_trait(id);
            }
        })
    }

    fn remove_trait(&self, id: u64) {
        let behavior = self
            .inner
            .traits
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Rc::clone(&entry.behavior));
        let Some(behavior) = behavior else {
            return;
        };
        let before = self.snapshot_values(&behavior.provided_properties());
        if self.is_attached() {
            behavior.on_detach(self);
        }
        self.inner.traits.borrow_mut().retain(|entry| entry.id != id);
        trace!(cell = %self, trait_name = behavior.name(), "trait removed");
        self.refire(before);
    }

    fn snapshot_values(&self, keys: &[PropertyKey]) -> Vec<(PropertyKey, Value)> {
        let mut unique: Vec<PropertyKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(key) {
                unique.push(*key);
            }
        }
        unique
            .into_iter()
            .map(|key| (key, self.get_erased(key)))
            .collect()
    }

    fn refire(&self, before: Vec<(PropertyKey, Value)>) {
        for (key, old) in before {
            let new = self.get_erased(key);
            if !old.eq_value(&*new) {
                self.fire_property_changed(&PropertyChange::new(key, old, new));
            }
        }
    }

    pub(crate) fn trait_snapshot(&self) -> Vec<Rc<dyn CellTrait>> {
        self.inner
            .traits
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.behavior))
            .collect()
    }

    /// Number of installed traits.
    #[must_use]
    pub fn trait_count(&self) -> usize {
        self.inner.traits.borrow().len()
    }

    pub fn add_listener(&self, listener: impl CellListener + 'static) -> Registration {
        let id = next_entry_id();
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Call `f(old, new)` whenever the resolved value of `spec` changes.
    pub fn on_property_changed<S: PropertySpec>(
        &self,
        spec: &'static S,
        f: impl Fn(&S::Value, &S::Value) + 'static,
    ) -> Registration {
        self.add_listener(PropertyListenerFn(
            move |_cell: &Cell, change: &PropertyChange| {
                if let Some((old, new)) = change.values(spec) {
                    f(&old, &new);
                }
            },
        ))
    }

    fn listener_snapshot(&self) -> Vec<Rc<dyn CellListener>> {
        self.inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn children(&self) -> Children<'_> {
        Children::new(self)
    }

    /// Owning cell: the parent of a child or the owner of a popup.
    #[must_use]
    pub fn parent(&self) -> Option<Cell> {
        upgrade(&self.inner.parent)
    }

    #[must_use]
    pub fn prev_sibling(&self) -> Option<Cell> {
        upgrade(&self.inner.prev_sibling)
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<Cell> {
        upgrade(&self.inner.next_sibling)
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Cell> {
        self.children().first()
    }

    #[must_use]
    pub fn last_child(&self) -> Option<Cell> {
        self.children().last()
    }

    /// Owners from the parent up to the tree root.
    pub fn ancestors(&self) -> impl Iterator<Item = Cell> + use<> {
        std::iter::successors(self.parent(), Cell::parent)
    }

    /// True if `self` is `ancestor` or lies below it, through children or
    /// popup slots.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Cell) -> bool {
        self == ancestor || self.ancestors().any(|a| a == *ancestor)
    }

    pub(crate) fn set_parent(&self, parent: Option<&Cell>) {
        *self.inner.parent.borrow_mut() = downgrade(parent);
    }

    pub(crate) fn set_prev_sibling(&self, prev: Option<&Cell>) {
        *self.inner.prev_sibling.borrow_mut() = downgrade(prev);
    }

    pub(crate) fn set_next_sibling(&self, next: Option<&Cell>) {
        *self.inner.next_sibling.borrow_mut() = downgrade(next);
    }

    pub(crate) fn link(&self, parent: Option<&Cell>, prev: Option<&Cell>, next: Option<&Cell>) {
        self.set_parent(parent);
        self.set_prev_sibling(prev);
        self.set_next_sibling(next);
    }

    pub(crate) fn unlink(&self) {
        self.link(None, None, None);
    }

    pub(crate) fn fire_before_child_added(&self, event: &ChildEvent) {
        for behavior in self.trait_snapshot() {
            behavior.on_before_child_added(self, event);
        }
        if let Some(container) = self.container() {
            container.each_listener(|l| l.on_before_child_added(self, event));
        }
    }

    pub(crate) fn fire_child_added(&self, event: &ChildEvent) {
        for behavior in self.trait_snapshot() {
            behavior.on_child_added(self, event);
        }
        for listener in self.listener_snapshot() {
            listener.on_child_added(self, event);
        }
        if let Some(container) = self.container() {
            container.each_listener(|l| l.on_child_added(self, event));
        }
    }

    pub(crate) fn fire_before_child_removed(&self, event: &ChildEvent) {
        for behavior in self.trait_snapshot() {
            behavior.on_before_child_removed(self, event);
        }
        if let Some(container) = self.container() {
            container.each_listener(|l| l.on_before_child_removed(self, event));
        }
    }

    pub(crate) fn fire_child_removed(&self, event: &ChildEvent) {
        for behavior in self.trait_snapshot() {
            behavior.on_child_removed(self, event);
        }
        for listener in self.listener_snapshot() {
            listener.on_child_removed(self, event);
        }
        if let Some(container) = self.container() {
            container.each_listener(|l| l.on_child_removed(self, event));
        }
    }

    // -----------------------------------------------------------------------
    // Attach / detach
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.container.borrow().strong_count() > 0
    }

    /// The container this cell is attached to.
    #[must_use]
    pub fn container(&self) -> Option<CellContainer> {
        CellContainer::from_weak(&self.inner.container.borrow())
    }

    fn attached_container(&self) -> Result<CellContainer> {
        self.container().ok_or_else(|| CellError::NotAttached {
            cell: self.to_string(),
        })
    }

    /// Attach this subtree, popups included, to `container`.
    pub(crate) fn attach(&self, container: &CellContainer) {
        *self.inner.container.borrow_mut() = container.downgrade();
        if self.is_popup() {
            container.register_popup(self);
        }
        debug!(cell = %self, "attach");
        for behavior in self.trait_snapshot() {
            behavior.on_attach(self);
        }
        for child in self.children() {
            child.attach(container);
        }
        for popup in self.popups() {
            popup.attach(container);
        }
    }

    /// Detach this subtree, innermost cells first.
    pub(crate) fn detach(&self) {
        for popup in self.popups().into_iter().rev() {
            popup.detach();
        }
        for child in self.children().iter().rev() {
            child.detach();
        }
        for behavior in self.trait_snapshot() {
            behavior.on_detach(self);
        }
        if let Some(container) = self.container() {
            container.unregister_popup(self);
            container.forget_cell(self);
        }
        debug!(cell = %self, "detach");
        *self.inner.container.borrow_mut() = Weak::new();
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Make this cell the container's focused cell.
    ///
    /// Fails unless the cell is focusable, visible (through all its
    /// ancestors) and attached.
    pub fn focus(&self) -> Result<()> {
        self.check_focusable()?;
        self.attached_container()?.set_focused_cell(Some(self.clone()))
    }

    pub(crate) fn check_focusable(&self) -> Result<()> {
        if !self.focusable() {
            return Err(CellError::NotFocusable {
                cell: self.to_string(),
            });
        }
        if !self.is_effectively_visible() {
            return Err(CellError::NotVisible {
                cell: self.to_string(),
            });
        }
        if !self.is_attached() {
            return Err(CellError::NotAttached {
                cell: self.to_string(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Deliver `event` to this cell's traits, then to ancestors while the
    /// spec bubbles and the event stays unconsumed.
    pub fn dispatch<E: Consumable>(&self, event: &mut E, spec: &'static CellEventSpec<E>) {
        let mut current = Some(self.clone());
        while let Some(cell) = current {
            if event.is_consumed() {
                return;
            }
            trace!(cell = %cell, event = spec.name(), "dispatch");
            spec.deliver(&cell.trait_snapshot(), &cell, event);
            if !spec.is_bubbling() {
                return;
            }
            current = cell.parent();
        }
        if !event.is_consumed() {
            trace!(event = spec.name(), "event unconsumed at root");
        }
    }

    /// Deliver an application event to [`CellTrait::on_trait_event`].
    ///
    /// Stays on this cell unless the event spec was declared bubbling.
    pub fn dispatch_trait_event<E: Consumable + 'static>(
        &self,
        event: &mut E,
        spec: &'static TraitEventSpec<E>,
    ) {
        let key = spec.key();
        let mut current = Some(self.clone());
        while let Some(cell) = current {
            for behavior in cell.trait_snapshot() {
                if event.is_consumed() {
                    return;
                }
                behavior.on_trait_event(&cell, key, &mut *event);
            }
            if !spec.is_bubbling() {
                return;
            }
            current = cell.parent();
        }
    }

    // -----------------------------------------------------------------------
    // Geometry (delegated to the peer)
    // -----------------------------------------------------------------------

    pub fn bounds(&self) -> Result<Rect> {
        let container = self.attached_container()?;
        Ok(container.peer().bounds(self))
    }

    /// Scroll `rect`, relative to this cell, into view.
    pub fn scroll_to(&self, rect: Rect) -> Result<()> {
        let container = self.attached_container()?;
        container.peer().scroll_to(rect, self);
        Ok(())
    }

    /// Scroll the whole cell into view.
    pub fn scroll_into_view(&self) -> Result<()> {
        let bounds = self.bounds()?;
        self.scroll_to(Rect::from_size(bounds.width, bounds.height))
    }

    pub fn caret_at(&self, x: i32) -> Result<usize> {
        let container = self.attached_container()?;
        Ok(container.peer().caret_at(self, x))
    }

    pub fn caret_offset(&self, caret: usize) -> Result<i32> {
        let container = self.attached_container()?;
        Ok(container.peer().caret_offset(self, caret))
    }

    /// Deepest cell of this subtree under `point`.
    pub fn find_cell(&self, point: Point) -> Result<Option<Cell>> {
        let container = self.attached_container()?;
        Ok(container.peer().find_cell(self, point))
    }
}

fn same_type(a: &Value, b: &Value) -> bool {
    (**a).as_any().type_id() == (**b).as_any().type_id()
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.inner.kind, self.inner.id)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.inner.id.0)
            .field("kind", &self.inner.kind)
            .field("children", &self.inner.children.borrow().len())
            .field("traits", &self.inner.traits.borrow().len())
            .field("attached", &self.is_attached())
            .finish()
    }
}
