#![forbid(unsafe_code)]

//! Built-in cell properties.
//!
//! Common properties apply to every cell. The text, image and scroll
//! groups are only meaningful on cells of the matching [`CellKind`], but
//! nothing stops a trait from reading them elsewhere.
//!
//! Popup slots and the `POPUP` flag live in [`crate::popup`].

use cellkit_core::color::Color;
use cellkit_core::geometry::Point;

use crate::cell::CellKind;
use crate::property::CellPropertySpec;

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

pub static VISIBLE: CellPropertySpec<bool> = CellPropertySpec::new("visible", |_| true);

/// Defaults to `true` for text cells only.
pub static FOCUSABLE: CellPropertySpec<bool> =
    CellPropertySpec::new("focusable", |cell| cell.kind() == CellKind::Text);

/// Maintained by the container; do not write directly.
pub static FOCUSED: CellPropertySpec<bool> = CellPropertySpec::new("focused", |_| false);

pub static SELECTED: CellPropertySpec<bool> = CellPropertySpec::new("selected", |_| false);

pub static FOCUS_HIGHLIGHTED: CellPropertySpec<bool> =
    CellPropertySpec::new("focusHighlighted", |_| false);

pub static HAS_SHADOW: CellPropertySpec<bool> = CellPropertySpec::new("hasShadow", |_| false);

pub static BACKGROUND: CellPropertySpec<Option<Color>> =
    CellPropertySpec::new("background", |_| None);

pub static BORDER_COLOR: CellPropertySpec<Option<Color>> =
    CellPropertySpec::new("borderColor", |_| None);

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub static TEXT: CellPropertySpec<String> = CellPropertySpec::new("text", |_| String::new());

pub static TEXT_COLOR: CellPropertySpec<Color> =
    CellPropertySpec::new("textColor", |_| Color::BLACK);

pub static BOLD: CellPropertySpec<bool> = CellPropertySpec::new("bold", |_| false);

/// Caret position in characters from the start of the text.
pub static CARET_POSITION: CellPropertySpec<usize> =
    CellPropertySpec::new("caretPosition", |_| 0);

pub static CARET_VISIBLE: CellPropertySpec<bool> =
    CellPropertySpec::new("caretVisible", |_| false);

pub static SELECTION_VISIBLE: CellPropertySpec<bool> =
    CellPropertySpec::new("selectionVisible", |_| false);

/// The selection spans from here to the caret.
pub static SELECTION_START: CellPropertySpec<usize> =
    CellPropertySpec::new("selectionStart", |_| 0);

// ---------------------------------------------------------------------------
// Image and scroll
// ---------------------------------------------------------------------------

/// Image source, interpreted by the peer.
pub static IMAGE: CellPropertySpec<Option<String>> = CellPropertySpec::new("image", |_| None);

/// Largest viewport size (width, height) of a scroll cell before it scrolls.
pub static MAX_DIMENSION: CellPropertySpec<Option<Point>> =
    CellPropertySpec::new("maxDimension", |_| None);
