#![forbid(unsafe_code)]

//! Kind-negotiated clipboard payloads.
//!
//! A payload advertises which [`ContentKind`]s it can produce. Structured
//! payloads (copied subtrees, AST fragments) stay inside the process; the
//! text kinds are the bridge to the host clipboard.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A clipboard data flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Arbitrary plain text. Values are `String`.
    Text,
    /// Text with no line breaks. Values are `String`.
    SingleLineText,
    /// Application-defined flavor, identified by name.
    Custom(&'static str),
}

/// Clipboard payload.
pub trait ClipboardContent: fmt::Debug {
    fn is_supported(&self, kind: ContentKind) -> bool;

    /// Value for `kind`, or `None` when the kind is unsupported.
    fn get(&self, kind: ContentKind) -> Option<Rc<dyn Any>>;

    /// Plain-text rendition used to mirror the payload on the host clipboard.
    fn text(&self) -> Option<String> {
        self.get(ContentKind::Text)
            .and_then(|value| value.downcast_ref::<String>().cloned())
    }
}

/// Plain text payload.
///
/// Supports [`ContentKind::Text`] always and [`ContentKind::SingleLineText`]
/// only when the text has no line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn is_single_line(&self) -> bool {
        !self.text.contains(['\n', '\r'])
    }
}

impl ClipboardContent for TextContent {
    fn is_supported(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => true,
            ContentKind::SingleLineText => self.is_single_line(),
            ContentKind::Custom(_) => false,
        }
    }

    fn get(&self, kind: ContentKind) -> Option<Rc<dyn Any>> {
        if self.is_supported(kind) {
            Some(Rc::new(self.text.clone()))
        } else {
            None
        }
    }

    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }
}
