#![forbid(unsafe_code)]

//! Change-notifying shared values.
//!
//! The cell container publishes its focused-cell slot through an
//! [`Observable`], and peers report host focus through another. Handles are
//! cheap clones of one shared slot.
//!
//! Subscribers are called with `(old, new)` in subscription order, after
//! the value has been stored and with no borrow held, so a subscriber may
//! read the slot or write it again. A nested write notifies all subscribers
//! before the outer notification continues.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

type Callback<T> = Rc<dyn Fn(&T, &T)>;

struct Subscribers<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<T>)>>,
}

struct Slot<T> {
    value: RefCell<T>,
    changes: Cell<u64>,
    subscribers: Rc<Subscribers<T>>,
}

/// A shared value that notifies subscribers when it changes.
///
/// Writing a value equal to the current one (by `PartialEq`) changes
/// nothing and notifies nobody.
pub struct Observable<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.slot.value.borrow())
            .field("changes", &self.slot.changes.get())
            .field("subscribers", &self.slot.subscribers.entries.borrow().len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(Slot {
                value: RefCell::new(value),
                changes: Cell::new(0),
                subscribers: Rc::new(Subscribers {
                    next_id: Cell::new(0),
                    entries: RefCell::new(Vec::new()),
                }),
            }),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.slot.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.value.borrow())
    }

    /// Store `value` and notify subscribers. Returns `false` if `value`
    /// equals the current value.
    pub fn set(&self, value: T) -> bool {
        if *self.slot.value.borrow() == value {
            return false;
        }
        let old = self.slot.value.replace(value.clone());
        self.slot.changes.set(self.slot.changes.get() + 1);

        let callbacks: Vec<Callback<T>> = self
            .slot
            .subscribers
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        trace!(subscribers = callbacks.len(), "observable changed");
        for callback in callbacks {
            callback(&old, &value);
        }
        true
    }

    /// Call `callback(old, new)` on every change until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T, &T) + 'static) -> Subscription {
        let subscribers = &self.slot.subscribers;
        let id = subscribers.next_id.get();
        subscribers.next_id.set(id + 1);
        subscribers
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));

        let weak: Weak<Subscribers<T>> = Rc::downgrade(subscribers);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(subscribers) = weak.upgrade() {
                    subscribers.entries.borrow_mut().retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.changes.get()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slot.subscribers.entries.borrow().len()
    }
}

/// Keeps an [`Observable`] subscription alive. Dropping it unsubscribes
/// immediately.
#[must_use = "dropping a Subscription unsubscribes at once"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
