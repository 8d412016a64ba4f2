#![forbid(unsafe_code)]

//! Property resolution through stacked traits.
//!
//! # Invariants tested
//!
//! 1. Installing or removing a trait fires exactly one change per property
//!    whose resolved value moved, comparing across the whole stack.
//! 2. A trait that does not change the resolved value fires nothing, even
//!    if it provides the property.
//! 3. Explicit cell entries win over every trait.
//! 4. An explicit null answer stops the scan; a wrongly typed answer is
//!    skipped.
//! 5. Traits see attach and detach, including on install and removal.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use cellkit_cell::{
    BACKGROUND, Cell, CellContainer, CellTrait, Lookup, PropertyKey, PropertySpec,
    TraitPropertySpec, ValueTrait,
};
use cellkit_core::color::Color;
use common::{ContainerRecorder, new_log, take};

static VALIDATOR: TraitPropertySpec<String> =
    TraitPropertySpec::new("validator", |_| "none".to_string());

static HINT: TraitPropertySpec<Option<String>> = TraitPropertySpec::new("hint", |_| None);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Changes<T> = Rc<RefCell<Vec<(T, T)>>>;

fn watch<S: PropertySpec>(cell: &Cell, spec: &'static S) -> Changes<S::Value> {
    let changes: Changes<S::Value> = Rc::default();
    let sink = Rc::clone(&changes);
    let _ = cell.on_property_changed(spec, move |old, new| {
        sink.borrow_mut().push((old.clone(), new.clone()));
    });
    changes
}

fn drain<T>(changes: &Changes<T>) -> Vec<(T, T)> {
    std::mem::take(&mut *changes.borrow_mut())
}

fn validator(name: &'static str, value: &str) -> ValueTrait {
    ValueTrait::new(name).with(&VALIDATOR, value.to_string())
}

fn pair(old: &str, new: &str) -> (String, String) {
    (old.to_string(), new.to_string())
}

// ---------------------------------------------------------------------------
// Shadowing
// ---------------------------------------------------------------------------

#[test]
fn shadowing_trait_fires_once_per_transition() {
    common::init_tracing();
    let cell = Cell::text("field");
    let changes = watch(&cell, &VALIDATOR);

    let t1 = cell.add_trait(validator("t1", "a"));
    let t2 = cell.add_trait(validator("t2", "b"));
    assert_eq!(cell.get(&VALIDATOR), "b");
    assert_eq!(drain(&changes), [pair("none", "a"), pair("a", "b")]);

    t2.remove();
    assert_eq!(drain(&changes), [pair("b", "a")]);
    t1.remove();
    assert_eq!(drain(&changes), [pair("a", "none")]);
    assert_eq!(cell.trait_count(), 0);
}

#[test]
fn equal_override_is_silent() {
    let cell = Cell::text("field");
    let changes = watch(&cell, &VALIDATOR);
    let _t1 = cell.add_trait(validator("t1", "same"));
    drain(&changes);

    let t2 = cell.add_trait(validator("t2", "same"));
    assert!(drain(&changes).is_empty());
    t2.remove();
    assert!(drain(&changes).is_empty());
}

#[test]
fn removing_a_shadowed_trait_is_silent() {
    let cell = Cell::text("field");
    let changes = watch(&cell, &VALIDATOR);
    let t1 = cell.add_trait(validator("t1", "under"));
    let _t2 = cell.add_trait(validator("t2", "over"));
    drain(&changes);

    t1.remove();

    assert!(drain(&changes).is_empty());
    assert_eq!(cell.get(&VALIDATOR), "over");
}

#[test]
fn explicit_entry_beats_traits() {
    let cell = Cell::text("field");
    let changes = watch(&cell, &BACKGROUND);
    let _set = cell.set(&BACKGROUND, Some(Color::BLACK));
    drain(&changes);

    let decoration = cell.add_trait(ValueTrait::new("deco").with(&BACKGROUND, Some(Color::WHITE)));
    assert!(drain(&changes).is_empty());
    assert_eq!(cell.get(&BACKGROUND), Some(Color::BLACK));

    let _clear = cell.clear(&BACKGROUND);
    assert_eq!(drain(&changes), [(Some(Color::BLACK), Some(Color::WHITE))]);

    decoration.remove();
    assert_eq!(drain(&changes), [(Some(Color::WHITE), None)]);
}

#[test]
fn container_listeners_see_trait_driven_changes() {
    let container = CellContainer::new();
    let cell = Cell::text("field");
    container.root().children().add(cell.clone()).unwrap();
    let log = new_log();
    let _l = container.add_listener(ContainerRecorder::new(&log));

    let t = cell.add_trait(validator("t", "strict"));
    t.remove();

    assert_eq!(take(&log), ["changed:validator", "changed:validator"]);
}

// ---------------------------------------------------------------------------
// Lookup answers
// ---------------------------------------------------------------------------

#[test]
fn explicit_null_stops_the_scan() {
    let cell = Cell::text("field");
    let _below = cell.add_trait(ValueTrait::new("below").with(&HINT, Some("type a name".into())));
    assert_eq!(cell.get(&HINT).as_deref(), Some("type a name"));

    let _above = cell.add_trait(ValueTrait::new("above").with(&HINT, None));

    assert_eq!(cell.get(&HINT), None);
}

/// Answers `VALIDATOR` with a number.
struct Confused;

impl CellTrait for Confused {
    fn name(&self) -> &'static str {
        "confused"
    }

    fn get(&self, _cell: &Cell, key: PropertyKey) -> Lookup {
        if key.is(&VALIDATOR) {
            Lookup::of(7_u32)
        } else {
            Lookup::Pass
        }
    }
}

#[test]
fn wrongly_typed_answer_is_skipped() {
    common::init_tracing();
    let cell = Cell::text("field");
    let _good = cell.add_trait(validator("good", "kept"));
    let _bad = cell.add_trait(Confused);

    assert_eq!(cell.get(&VALIDATOR), "kept");
}

// ---------------------------------------------------------------------------
// Lifecycle hooks
// ---------------------------------------------------------------------------

struct Lifecycle(Rc<RefCell<Vec<&'static str>>>);

impl CellTrait for Lifecycle {
    fn on_attach(&self, _cell: &Cell) {
        self.0.borrow_mut().push("attach");
    }

    fn on_detach(&self, _cell: &Cell) {
        self.0.borrow_mut().push("detach");
    }
}

#[test]
fn traits_follow_attach_state() {
    let container = CellContainer::new();
    let cell = Cell::text("field");
    let events: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let t = cell.add_trait(Lifecycle(Rc::clone(&events)));
    assert!(events.borrow().is_empty());

    container.root().children().add(cell.clone()).unwrap();
    assert!(container.root().children().remove_cell(&cell).unwrap());
    container.root().children().add(cell.clone()).unwrap();
    t.remove();

    assert_eq!(*events.borrow(), ["attach", "detach", "attach", "detach"]);
}
