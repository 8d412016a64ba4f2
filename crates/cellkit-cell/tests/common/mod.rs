#![allow(dead_code)]

//! Shared fixtures for cellkit-cell integration tests.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;
use cellkit_cell::{
    Cell, CellContainer, CellContainerListener, CellContainerPeer, CellId, CellTrait, ChildEvent,
    PropertyChange,
};
use cellkit_core::clipboard::TextContent;
use cellkit_core::event::{
    CompletionEvent, Consumable, CopyCutEvent, FocusEvent, KeyEvent, MouseEvent, PasteEvent,
};
use cellkit_core::geometry::{Point, Rect};
use cellkit_core::observable::Observable;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

fn push(log: &Log, entry: String) {
    log.borrow_mut().push(entry);
}

// ---------------------------------------------------------------------------
// Layout peer
// ---------------------------------------------------------------------------

/// Peer with an explicit rectangle per cell and 10-unit-wide characters.
///
/// Hit-testing returns the deepest visible placed cell under the point,
/// preferring later siblings (drawn on top).
#[derive(Default)]
pub struct LayoutPeer {
    rects: RefCell<AHashMap<CellId, Rect>>,
    scrolled: RefCell<Vec<(CellId, Rect)>>,
    focus_requests: StdCell<u32>,
    focused: Observable<bool>,
}

pub const CHAR_WIDTH: i32 = 10;

impl LayoutPeer {
    pub fn install(container: &CellContainer) -> Rc<Self> {
        let peer = Rc::new(Self::default());
        container.set_peer_rc(peer.clone());
        peer
    }

    pub fn place(&self, cell: &Cell, rect: Rect) {
        self.rects.borrow_mut().insert(cell.id(), rect);
    }

    pub fn scrolled(&self) -> Vec<(CellId, Rect)> {
        self.scrolled.borrow().clone()
    }

    pub fn focus_requests(&self) -> u32 {
        self.focus_requests.get()
    }

    fn hit(&self, cell: &Cell, point: Point) -> Option<Cell> {
        if !cell.visible() {
            return None;
        }
        let rect = self.rects.borrow().get(&cell.id()).copied()?;
        if !rect.contains(point) {
            return None;
        }
        cell.children()
            .iter()
            .rev()
            .find_map(|child| self.hit(&child, point))
            .or_else(|| Some(cell.clone()))
    }
}

impl CellContainerPeer for LayoutPeer {
    fn bounds(&self, cell: &Cell) -> Rect {
        self.rects
            .borrow()
            .get(&cell.id())
            .copied()
            .unwrap_or_default()
    }

    fn caret_at(&self, cell: &Cell, x: i32) -> usize {
        let len = cell.text_value().chars().count();
        let left = self.bounds(cell).x;
        let offset = ((x - left).max(0) + CHAR_WIDTH / 2) / CHAR_WIDTH;
        usize::try_from(offset).unwrap_or(0).min(len)
    }

    fn caret_offset(&self, _cell: &Cell, caret: usize) -> i32 {
        i32::try_from(caret).unwrap_or(i32::MAX) * CHAR_WIDTH
    }

    fn scroll_to(&self, rect: Rect, cell: &Cell) {
        self.scrolled.borrow_mut().push((cell.id(), rect));
    }

    fn find_cell(&self, root: &Cell, point: Point) -> Option<Cell> {
        self.hit(root, point)
    }

    fn visible_rect(&self) -> Rect {
        Rect::from_size(800, 600)
    }

    fn request_focus(&self) {
        self.focus_requests.set(self.focus_requests.get() + 1);
        self.focused.set(true);
    }

    fn focused(&self) -> Observable<bool> {
        self.focused.clone()
    }
}

// ---------------------------------------------------------------------------
// Recording trait
// ---------------------------------------------------------------------------

/// Trait that logs every input and focus event as `"<tag>:<event>"`.
pub struct Recorder {
    tag: &'static str,
    log: Log,
    consume: bool,
    copy_text: Option<&'static str>,
}

impl Recorder {
    pub fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            log: Rc::clone(log),
            consume: false,
            copy_text: None,
        }
    }

    /// Consume every event this trait sees.
    pub fn consuming(mut self) -> Self {
        self.consume = true;
        self
    }

    /// Answer copy and cut with `text`.
    pub fn copying(mut self, text: &'static str) -> Self {
        self.copy_text = Some(text);
        self
    }

    fn record(&self, name: &str, event: &mut impl Consumable) {
        push(&self.log, format!("{}:{name}", self.tag));
        if self.consume {
            event.consume();
        }
    }
}

impl CellTrait for Recorder {
    fn name(&self) -> &'static str {
        self.tag
    }

    fn on_key_pressed(&self, _cell: &Cell, event: &mut KeyEvent) {
        self.record("key_pressed", event);
    }

    fn on_key_released(&self, _cell: &Cell, event: &mut KeyEvent) {
        self.record("key_released", event);
    }

    fn on_key_typed(&self, _cell: &Cell, event: &mut KeyEvent) {
        self.record("key_typed", event);
    }

    fn on_mouse_pressed(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("pressed", event);
    }

    fn on_mouse_released(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("released", event);
    }

    fn on_mouse_moved(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("moved", event);
    }

    fn on_mouse_dragged(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("dragged", event);
    }

    fn on_mouse_entered(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("entered", event);
    }

    fn on_mouse_left(&self, _cell: &Cell, event: &mut MouseEvent) {
        self.record("left", event);
    }

    fn on_focus_gained(&self, cell: &Cell, _event: &mut FocusEvent) {
        push(&self.log, format!("{}:focus_gained({})", self.tag, cell.focused()));
    }

    fn on_focus_lost(&self, cell: &Cell, _event: &mut FocusEvent) {
        let focused_elsewhere = cell
            .container()
            .and_then(|c| c.focused_cell())
            .is_some_and(|f| f != *cell);
        push(
            &self.log,
            format!("{}:focus_lost(new_focused={focused_elsewhere})", self.tag),
        );
    }

    fn on_copy(&self, _cell: &Cell, event: &mut CopyCutEvent) {
        push(&self.log, format!("{}:copy", self.tag));
        if let Some(text) = self.copy_text {
            event.consume_with(Rc::new(TextContent::new(text)));
        }
    }

    fn on_cut(&self, _cell: &Cell, event: &mut CopyCutEvent) {
        push(&self.log, format!("{}:cut", self.tag));
        if let Some(text) = self.copy_text {
            event.consume_with(Rc::new(TextContent::new(text)));
        }
    }

    fn on_paste(&self, _cell: &Cell, event: &mut PasteEvent) {
        let text = event.content().text().unwrap_or_default();
        push(&self.log, format!("{}:paste({text})", self.tag));
        if self.consume {
            event.consume();
        }
    }

    fn on_complete(&self, _cell: &Cell, event: &mut CompletionEvent) {
        self.record("complete", event);
    }
}

// ---------------------------------------------------------------------------
// Recording container listener
// ---------------------------------------------------------------------------

/// Container listener that logs command brackets, property changes and
/// structure changes.
pub struct ContainerRecorder {
    log: Log,
}

impl ContainerRecorder {
    pub fn new(log: &Log) -> Self {
        Self {
            log: Rc::clone(log),
        }
    }
}

impl CellContainerListener for ContainerRecorder {
    fn on_before_command(&self) {
        push(&self.log, "before_command".into());
    }

    fn on_after_command(&self) {
        push(&self.log, "after_command".into());
    }

    fn on_cell_property_changed(&self, _cell: &Cell, change: &PropertyChange) {
        push(&self.log, format!("changed:{}", change.key().name()));
    }

    fn on_before_child_added(&self, _parent: &Cell, event: &ChildEvent) {
        push(&self.log, format!("before_add:{}", event.index));
    }

    fn on_child_added(&self, _parent: &Cell, event: &ChildEvent) {
        push(&self.log, format!("added:{}", event.index));
    }

    fn on_before_child_removed(&self, _parent: &Cell, event: &ChildEvent) {
        push(&self.log, format!("before_remove:{}", event.index));
    }

    fn on_child_removed(&self, _parent: &Cell, event: &ChildEvent) {
        push(&self.log, format!("removed:{}", event.index));
    }
}

/// `count` text cells under the container root, laid out in a row of
/// 100x20 boxes with the root covering all of them.
pub fn text_row(container: &CellContainer, peer: &LayoutPeer, count: i32) -> Vec<Cell> {
    let root = container.root();
    peer.place(&root, Rect::new(0, 0, 100 * count, 20));
    (0..count)
        .map(|i| {
            let cell = Cell::text(format!("cell{i}"));
            root.children().add(cell.clone()).expect("fresh cell");
            peer.place(&cell, Rect::new(100 * i, 0, 100, 20));
            cell
        })
        .collect()
}
