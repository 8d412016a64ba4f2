#![forbid(unsafe_code)]

//! Capability tokens returned by every reversible operation.
//!
//! Unlike [`cellkit_core::Subscription`], dropping a `Registration` does
//! nothing: the operation it undoes (a property write, a trait install, a
//! listener) stays in effect until [`Registration::remove`] is called.

use std::fmt;

/// Token whose `remove` reverts exactly one operation.
pub struct Registration {
    remover: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    pub fn new(remover: impl FnOnce() + 'static) -> Self {
        Self {
            remover: Some(Box::new(remover)),
        }
    }

    /// A token for an operation that had no effect.
    #[must_use]
    pub fn empty() -> Self {
        Self { remover: None }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remover.is_none()
    }

    /// Revert the operation. Calling this on an empty token does nothing.
    pub fn remove(mut self) {
        if let Some(remover) = self.remover.take() {
            remover();
        }
    }

    /// Combine several tokens into one that removes them in reverse order.
    pub fn composite(registrations: Vec<Registration>) -> Self {
        if registrations.iter().all(Registration::is_empty) {
            return Self::empty();
        }
        Self::new(move || {
            for registration in registrations.into_iter().rev() {
                registration.remove();
            }
        })
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("empty", &self.is_empty())
            .finish()
    }
}
