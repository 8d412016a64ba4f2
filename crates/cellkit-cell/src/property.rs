#![forbid(unsafe_code)]

//! Typed, identity-compared property keys.
//!
//! # Design
//!
//! A property spec is a `static` value: its address is its identity, its
//! name is only for diagnostics. Two specs with the same name and type are
//! different properties.
//!
//! ```
//! use cellkit_cell::property::{CellPropertySpec, PropertySpec};
//!
//! static INDENT: CellPropertySpec<u32> = CellPropertySpec::new("indent", |_| 0);
//! static OTHER_INDENT: CellPropertySpec<u32> = CellPropertySpec::new("indent", |_| 0);
//! assert_ne!(INDENT.key(), OTHER_INDENT.key());
//! ```
//!
//! Specs must be declared as `static` items, never `const`: a `const` is
//! copied at every use site and has no stable address.
//!
//! There are two kinds:
//!
//! - [`CellPropertySpec`]: stored per cell in a sparse map, writable.
//! - [`TraitPropertySpec`]: resolved only through the trait chain and the
//!   spec default, never stored on the cell.
//!
//! Values travel type-erased as [`Value`] (`Rc<dyn AnyValue>`) between the
//! cell, its traits and listeners, and are decoded back with their property spec.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::warn;

use crate::cell::Cell;

/// Bound for property value types.
pub trait PropertyType: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> PropertyType for T {}

/// Object-safe view of a property value.
pub trait AnyValue: fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// Equality across the erased boundary. Values of different types are unequal.
    fn eq_value(&self, other: &dyn AnyValue) -> bool;
}

impl<T: PropertyType> AnyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_value(&self, other: &dyn AnyValue) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }
}

/// A type-erased property value.
pub type Value = Rc<dyn AnyValue>;

/// Object-safe view of a property spec.
pub trait ErasedSpec {
    fn name(&self) -> &'static str;

    fn default_value(&self, cell: &Cell) -> Value;

    /// `true` for cell properties, `false` for trait properties.
    fn is_stored(&self) -> bool;
}

/// Common interface of both spec kinds.
pub trait PropertySpec: ErasedSpec + Sized + 'static {
    type Value: PropertyType;

    fn default_for(&self, cell: &Cell) -> Self::Value;

    /// The identity key of this spec.
    fn key(&'static self) -> PropertyKey {
        PropertyKey(self)
    }
}

/// Identity of a property spec, usable as a map key.
#[derive(Clone, Copy)]
pub struct PropertyKey(&'static dyn ErasedSpec);

impl PropertyKey {
    fn addr(&self) -> *const () {
        self.0 as *const dyn ErasedSpec as *const ()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// True if this key identifies `spec`.
    #[must_use]
    pub fn is<S: PropertySpec>(&self, spec: &'static S) -> bool {
        std::ptr::eq(self.addr(), (spec as *const S).cast::<()>())
    }

    /// Answer a trait lookup: `Lookup::of(value())` if this key is `spec`,
    /// otherwise [`Lookup::Pass`].
    pub fn answer<S: PropertySpec>(
        &self,
        spec: &'static S,
        value: impl FnOnce() -> S::Value,
    ) -> Lookup {
        if self.is(spec) {
            Lookup::of(value())
        } else {
            Lookup::Pass
        }
    }

    pub(crate) fn default_value(&self, cell: &Cell) -> Value {
        self.0.default_value(cell)
    }

    pub(crate) fn is_stored(&self) -> bool {
        self.0.is_stored()
    }
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.addr() as usize).hash(state);
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyKey({})", self.name())
    }
}

/// Stored, writable property. Absent entries resolve through the trait
/// chain and then `default`.
pub struct CellPropertySpec<T> {
    name: &'static str,
    default: fn(&Cell) -> T,
}

impl<T> CellPropertySpec<T> {
    pub const fn new(name: &'static str, default: fn(&Cell) -> T) -> Self {
        Self { name, default }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: PropertyType> ErasedSpec for CellPropertySpec<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self, cell: &Cell) -> Value {
        Rc::new((self.default)(cell))
    }

    fn is_stored(&self) -> bool {
        true
    }
}

impl<T: PropertyType> PropertySpec for CellPropertySpec<T> {
    type Value = T;

    fn default_for(&self, cell: &Cell) -> T {
        (self.default)(cell)
    }
}

impl<T> fmt::Debug for CellPropertySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellPropertySpec({})", self.name)
    }
}

/// Property answered only by traits (e.g. a completion supplier or a
/// validator); reads fall back to `default` when no trait has an opinion.
pub struct TraitPropertySpec<T> {
    name: &'static str,
    default: fn(&Cell) -> T,
}

impl<T> TraitPropertySpec<T> {
    pub const fn new(name: &'static str, default: fn(&Cell) -> T) -> Self {
        Self { name, default }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: PropertyType> ErasedSpec for TraitPropertySpec<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_value(&self, cell: &Cell) -> Value {
        Rc::new((self.default)(cell))
    }

    fn is_stored(&self) -> bool {
        false
    }
}

impl<T: PropertyType> PropertySpec for TraitPropertySpec<T> {
    type Value = T;

    fn default_for(&self, cell: &Cell) -> T {
        (self.default)(cell)
    }
}

impl<T> fmt::Debug for TraitPropertySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraitPropertySpec({})", self.name)
    }
}

/// A trait's answer to a property lookup.
///
/// `Pass` means "no opinion": the next trait is asked, then the property spec
/// default. An explicit null for an `Option<T>` property is
/// `Lookup::null::<T>()`, which stops the scan with `None`.
#[derive(Debug, Clone)]
pub enum Lookup {
    Pass,
    Value(Value),
}

impl Lookup {
    pub fn of<T: PropertyType>(value: T) -> Self {
        Lookup::Value(Rc::new(value))
    }

    pub fn null<T: PropertyType>() -> Self {
        Lookup::of(None::<T>)
    }
}

pub(crate) fn decode<T: PropertyType>(key: PropertyKey, value: &Value) -> Option<T> {
    let decoded = value.as_any().downcast_ref::<T>().cloned();
    if decoded.is_none() {
        warn!(
            property = key.name(),
            expected = std::any::type_name::<T>(),
            found = ?value,
            "property value has the wrong type; ignoring it"
        );
    }
    decoded
}

/// A resolved-value change of one property on one cell.
#[derive(Clone)]
pub struct PropertyChange {
    key: PropertyKey,
    old: Value,
    new: Value,
}

impl PropertyChange {
    pub(crate) fn new(key: PropertyKey, old: Value, new: Value) -> Self {
        Self { key, old, new }
    }

    #[must_use]
    pub fn key(&self) -> PropertyKey {
        self.key
    }

    #[must_use]
    pub fn is<S: PropertySpec>(&self, spec: &'static S) -> bool {
        self.key.is(spec)
    }

    /// Typed `(old, new)` if this change is for `spec`.
    pub fn values<S: PropertySpec>(&self, spec: &'static S) -> Option<(S::Value, S::Value)> {
        if !self.key.is(spec) {
            return None;
        }
        let old = decode::<S::Value>(self.key, &self.old)?;
        let new = decode::<S::Value>(self.key, &self.new)?;
        Some((old, new))
    }

    #[must_use]
    pub fn old_value(&self) -> &dyn AnyValue {
        &*self.old
    }

    #[must_use]
    pub fn new_value(&self) -> &dyn AnyValue {
        &*self.new
    }
}

impl fmt::Debug for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChange")
            .field("property", &self.key.name())
            .field("old", &self.old)
            .field("new", &self.new)
            .finish()
    }
}
