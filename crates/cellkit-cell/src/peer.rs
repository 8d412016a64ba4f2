#![forbid(unsafe_code)]

//! The geometry and host-integration contract a container delegates to.
//!
//! A peer knows where cells are drawn. The core never measures anything
//! itself: bounds, caret metrics, hit-testing and scrolling all come from
//! here. [`NullPeer`] answers with degenerate values so the tree can run
//! headless.

use std::time::Duration;

use cellkit_core::geometry::{Point, Rect};
use cellkit_core::observable::Observable;

use crate::cell::Cell;

/// Rendering-side provider of geometry, hit-testing and host focus.
#[allow(unused_variables)]
pub trait CellContainerPeer {
    /// Bounds of `cell` in container coordinates.
    fn bounds(&self, cell: &Cell) -> Rect;

    /// Caret position closest to the horizontal offset `x` in a text cell.
    fn caret_at(&self, cell: &Cell, x: i32) -> usize;

    /// Horizontal offset of caret position `caret` in a text cell.
    fn caret_offset(&self, cell: &Cell, caret: usize) -> i32;

    /// Scroll so that `rect` (relative to `cell`) becomes visible.
    fn scroll_to(&self, rect: Rect, cell: &Cell);

    /// Deepest cell under `point` in the subtree rooted at `root`.
    fn find_cell(&self, root: &Cell, point: Point) -> Option<Cell>;

    /// The part of the container currently visible on the host.
    fn visible_rect(&self) -> Rect;

    /// Ask the host to give keyboard focus to the container.
    fn request_focus(&self);

    /// Whether the host currently gives keyboard focus to the container.
    fn focused(&self) -> Observable<bool>;

    fn fade_in(&self, cell: &Cell, duration: Duration) {}

    fn fade_out(&self, cell: &Cell, duration: Duration) {}

    fn slide(&self, cell: &Cell, from: Point, duration: Duration) {}
}

/// Peer for headless use: zero-size bounds, no hit-testing, never focused.
#[derive(Debug, Default, Clone)]
pub struct NullPeer {
    focused: Observable<bool>,
}

impl NullPeer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CellContainerPeer for NullPeer {
    fn bounds(&self, _cell: &Cell) -> Rect {
        Rect::default()
    }

    fn caret_at(&self, _cell: &Cell, _x: i32) -> usize {
        0
    }

    fn caret_offset(&self, _cell: &Cell, _caret: usize) -> i32 {
        0
    }

    fn scroll_to(&self, _rect: Rect, _cell: &Cell) {}

    fn find_cell(&self, _root: &Cell, _point: Point) -> Option<Cell> {
        None
    }

    fn visible_rect(&self) -> Rect {
        Rect::default()
    }

    fn request_focus(&self) {}

    fn focused(&self) -> Observable<bool> {
        self.focused.clone()
    }
}
