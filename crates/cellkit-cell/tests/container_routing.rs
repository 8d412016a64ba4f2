#![forbid(unsafe_code)]

//! Input routing through a [`CellContainer`] with a real layout peer.
//!
//! # Invariants tested
//!
//! 1. Hit-testing picks the deepest placed cell; mouse events bubble.
//! 2. Drags and the release go to the press target, not the cell under
//!    the pointer.
//! 3. Hover changes deliver `left` to the old cell before `entered` to the
//!    new one, and never repeat for the same cell.
//! 4. Shortcuts run before key dispatch; completion falls through to the
//!    focused cell when nobody completes.
//! 5. Copy caches the payload; pasting the same text back reuses it.
//! 6. Every routed input is one command; nested commands do not re-bracket.

mod common;

use std::rc::Rc;

use cellkit_cell::{Cell, CellContainer, CellKind, ContainerConfig, VISIBLE};
use cellkit_core::clipboard::{ClipboardContent, ContentKind, TextContent};
use cellkit_core::event::{Consumable, KeyCode, KeyEvent, Modifiers, MouseEvent};
use cellkit_core::geometry::{Point, Rect};
use cellkit_core::keystroke::KeyStroke;
use common::{ContainerRecorder, LayoutPeer, Recorder, new_log, take, text_row};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Root with a vertical box holding two text cells:
///
/// ```text
/// root (0,0 200x100)
/// └── column (0,0 200x40)
///     ├── a (0,0 200x20)
///     └── b (0,20 200x20)
/// ```
fn column(container: &CellContainer, peer: &LayoutPeer) -> (Cell, Cell, Cell) {
    let root = container.root();
    let column = Cell::new(CellKind::Vertical);
    let a = Cell::text("alpha");
    let b = Cell::text("beta");
    root.children().add(column.clone()).unwrap();
    column.children().add(a.clone()).unwrap();
    column.children().add(b.clone()).unwrap();
    peer.place(&root, Rect::new(0, 0, 200, 100));
    peer.place(&column, Rect::new(0, 0, 200, 40));
    peer.place(&a, Rect::new(0, 0, 200, 20));
    peer.place(&b, Rect::new(0, 20, 200, 20));
    (column, a, b)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL)
}

// ---------------------------------------------------------------------------
// Hit-testing and bubbling
// ---------------------------------------------------------------------------

#[test]
fn press_hits_deepest_cell_and_bubbles() {
    common::init_tracing();
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let (column, a, _b) = column(&container, &peer);
    let log = new_log();
    let _r1 = a.add_trait(Recorder::new("a", &log));
    let _r2 = column.add_trait(Recorder::new("column", &log));

    assert_eq!(container.find_cell(Point::new(5, 5)), Some(a.clone()));
    container.mouse_pressed(&mut MouseEvent::at(5, 5));

    assert_eq!(take(&log), ["a:entered", "a:pressed", "column:pressed"]);
}

#[test]
fn consumed_press_stops_bubbling() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let (column, a, _b) = column(&container, &peer);
    let log = new_log();
    let _r1 = a.add_trait(Recorder::new("a", &log).consuming());
    let _r2 = column.add_trait(Recorder::new("column", &log));

    let mut event = MouseEvent::at(5, 5);
    container.mouse_pressed(&mut event);

    assert!(!take(&log).contains(&"column:pressed".to_string()));
}

#[test]
fn hidden_cells_are_not_hit() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let (column, a, _b) = column(&container, &peer);
    let _hide = a.set(&VISIBLE, false);

    assert_eq!(container.find_cell(Point::new(5, 5)), Some(column));
}

// ---------------------------------------------------------------------------
// Drag latch and hover
// ---------------------------------------------------------------------------

#[test]
fn drag_and_release_go_to_press_target() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let (_column, a, b) = column(&container, &peer);
    let log = new_log();
    let _ra = a.add_trait(Recorder::new("a", &log).consuming());
    let _rb = b.add_trait(Recorder::new("b", &log).consuming());

    container.mouse_pressed(&mut MouseEvent::at(5, 5));
    container.mouse_dragged(&mut MouseEvent::at(5, 25));
    container.mouse_released(&mut MouseEvent::at(5, 25));

    assert_eq!(
        take(&log),
        [
            "a:entered",
            "a:pressed",
            "a:left",
            "b:entered",
            "a:dragged",
            "a:released",
        ]
    );

    // Latch cleared: the next drag follows the pointer.
    container.mouse_dragged(&mut MouseEvent::at(5, 25));
    assert_eq!(take(&log), ["b:dragged"]);
}

#[test]
fn removed_press_target_releases_the_latch() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let (column, a, b) = column(&container, &peer);
    let log = new_log();
    let _rb = b.add_trait(Recorder::new("b", &log).consuming());

    container.mouse_pressed(&mut MouseEvent::at(5, 5));
    assert!(column.children().remove_cell(&a).unwrap());
    take(&log);

    container.mouse_dragged(&mut MouseEvent::at(5, 25));
    assert_eq!(take(&log), ["b:entered", "b:dragged"]);
}

#[test]
fn hover_enters_once_and_leaves_with_pointer() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 2);
    let log = new_log();
    let _r0 = cells[0].add_trait(Recorder::new("c0", &log).consuming());
    let _r1 = cells[1].add_trait(Recorder::new("c1", &log).consuming());

    container.mouse_moved(&mut MouseEvent::at(10, 5));
    container.mouse_moved(&mut MouseEvent::at(20, 5));
    container.mouse_moved(&mut MouseEvent::at(110, 5));
    assert_eq!(container.cell_under_mouse(), Some(cells[1].clone()));
    container.mouse_left(&mut MouseEvent::at(500, 5));

    assert_eq!(
        take(&log),
        [
            "c0:entered",
            "c0:moved",
            "c0:moved",
            "c0:left",
            "c1:entered",
            "c1:moved",
            "c1:left",
        ]
    );
    assert_eq!(container.cell_under_mouse(), None);
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

#[test]
fn copy_shortcut_never_reaches_key_handlers() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log).copying("cell0"));
    cells[0].focus().unwrap();
    take(&log);

    let mut event = ctrl('c');
    container.key_pressed(&mut event);

    assert!(event.is_consumed());
    assert_eq!(take(&log), ["c:copy"]);
    assert_eq!(container.last_seen_text().as_deref(), Some("cell0"));
}

#[test]
fn plain_keys_reach_the_focused_cell() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log));
    cells[0].focus().unwrap();
    take(&log);

    container.key_pressed(&mut KeyEvent::new(KeyCode::Char('q')));
    container.key_typed(&mut KeyEvent::new(KeyCode::Char('q')));
    container.key_released(&mut KeyEvent::new(KeyCode::Char('q')));

    assert_eq!(take(&log), ["c:key_pressed", "c:key_typed", "c:key_released"]);
}

#[test]
fn keys_without_focus_are_dropped() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log));

    let mut event = KeyEvent::new(KeyCode::Enter);
    container.key_pressed(&mut event);

    assert!(!event.is_consumed());
    assert!(take(&log).is_empty());
}

#[test]
fn unanswered_completion_falls_through_to_key_dispatch() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log));
    cells[0].focus().unwrap();
    take(&log);

    let mut event = KeyEvent::new(KeyCode::Space).with_modifiers(Modifiers::CTRL);
    container.key_pressed(&mut event);

    assert!(!event.is_consumed());
    assert_eq!(take(&log), ["c:complete", "c:key_pressed"]);
}

#[test]
fn answered_completion_consumes_the_key() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log).consuming());
    cells[0].focus().unwrap();
    take(&log);

    let mut event = KeyEvent::new(KeyCode::Space).with_modifiers(Modifiers::CTRL);
    container.key_pressed(&mut event);

    assert!(event.is_consumed());
    assert_eq!(take(&log), ["c:complete"]);
}

#[test]
fn configured_bindings_replace_defaults() {
    let config = ContainerConfig::new()
        .with_copy(vec![KeyStroke::new(KeyCode::Char('c'), Modifiers::SUPER)])
        .validated();
    let container = CellContainer::with_config(config);
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _r = cells[0].add_trait(Recorder::new("c", &log).copying("x"));
    cells[0].focus().unwrap();
    take(&log);

    container.key_pressed(&mut ctrl('c'));
    container.key_pressed(&mut KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::SUPER));

    assert_eq!(take(&log), ["c:key_pressed", "c:copy"]);
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

/// Payload that carries a custom flavor besides text.
#[derive(Debug)]
struct Rich;

impl ClipboardContent for Rich {
    fn is_supported(&self, kind: ContentKind) -> bool {
        matches!(kind, ContentKind::Text | ContentKind::Custom("rich"))
    }

    fn get(&self, kind: ContentKind) -> Option<Rc<dyn std::any::Any>> {
        match kind {
            ContentKind::Text => Some(Rc::new("rich text".to_string())),
            ContentKind::Custom("rich") => Some(Rc::new(42_u32)),
            _ => None,
        }
    }
}

struct RichCopier;

impl cellkit_cell::CellTrait for RichCopier {
    fn on_copy(&self, _cell: &Cell, event: &mut cellkit_core::event::CopyCutEvent) {
        event.consume_with(Rc::new(Rich));
    }

    fn on_paste(&self, _cell: &Cell, event: &mut cellkit_core::event::PasteEvent) {
        if event.content().is_supported(ContentKind::Custom("rich")) {
            event.consume();
        }
    }
}

#[test]
fn paste_of_own_text_reuses_structured_payload() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 1);
    let _r = cells[0].add_trait(RichCopier);
    cells[0].focus().unwrap();

    assert!(container.copy());
    assert_eq!(container.last_seen_text().as_deref(), Some("rich text"));

    assert!(container.paste_text("rich text"));
    assert!(!container.paste_text("something else"));
}

#[test]
fn paste_shortcut_uses_cached_payload() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 2);
    let log = new_log();
    let _r0 = cells[0].add_trait(Recorder::new("c0", &log).copying("moved"));
    let _r1 = cells[1].add_trait(Recorder::new("c1", &log).consuming());

    cells[0].focus().unwrap();
    container.key_pressed(&mut ctrl('x'));
    cells[1].focus().unwrap();
    take(&log);
    container.key_pressed(&mut ctrl('v'));

    assert_eq!(take(&log), ["c1:paste(moved)"]);
}

#[test]
fn failed_copy_keeps_previous_clipboard() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let cells = text_row(&container, &peer, 2);
    let log = new_log();
    let _r0 = cells[0].add_trait(Recorder::new("c0", &log).copying("kept"));
    let _r1 = cells[1].add_trait(Recorder::new("c1", &log));

    cells[0].focus().unwrap();
    assert!(container.copy());
    cells[1].focus().unwrap();
    assert!(!container.copy());

    let text = container.clipboard_content().and_then(|c| c.text());
    assert_eq!(text.as_deref(), Some("kept"));
    assert!(TextContent::new("kept").is_supported(ContentKind::SingleLineText));
}

// ---------------------------------------------------------------------------
// Command bracketing
// ---------------------------------------------------------------------------

#[test]
fn each_routed_input_is_one_command() {
    let container = CellContainer::new();
    let peer = LayoutPeer::install(&container);
    let _cells = text_row(&container, &peer, 1);
    let log = new_log();
    let _l = container.add_listener(ContainerRecorder::new(&log));

    container.mouse_moved(&mut MouseEvent::at(10, 5));
    container.key_pressed(&mut KeyEvent::new(KeyCode::Tab));

    assert_eq!(
        take(&log),
        ["before_command", "after_command", "before_command", "after_command"]
    );
}

#[test]
fn nested_commands_bracket_once() {
    let container = CellContainer::new();
    let log = new_log();
    let _l = container.add_listener(ContainerRecorder::new(&log));

    let value = container.execute_command(|| {
        assert!(container.in_command());
        container.execute_command(|| {
            container.root().children().add(Cell::text("t")).unwrap();
            7
        })
    });

    assert_eq!(value, 7);
    assert!(!container.in_command());
    assert_eq!(
        take(&log),
        ["before_command", "before_add:0", "added:0", "after_command"]
    );
}

#[test]
fn after_command_fires_when_the_body_panics() {
    let container = CellContainer::new();
    let log = new_log();
    let _l = container.add_listener(ContainerRecorder::new(&log));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        container.execute_command(|| panic!("boom"));
    }));

    assert!(result.is_err());
    assert!(!container.in_command());
    assert_eq!(take(&log), ["before_command", "after_command"]);
}
