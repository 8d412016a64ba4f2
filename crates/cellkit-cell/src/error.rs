#![forbid(unsafe_code)]

//! Usage errors raised by the cell tree and its container.
//!
//! Each variant is a caller contract violation. Entry points that validate
//! their arguments return them as `Err`; the few infallible entry points
//! that discover a violation mid-operation go through [`fatal`].

use thiserror::Error;
use tracing::error;

/// A violated contract of the cell tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("cell `{cell}` already has a parent")]
    AlreadyHasParent { cell: String },

    #[error("cell `{cell}` is already attached to a container")]
    AlreadyAttached { cell: String },

    #[error("inserting `{cell}` would make it its own ancestor")]
    WouldCreateCycle { cell: String },

    #[error("child index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("cell `{cell}` is not focusable")]
    NotFocusable { cell: String },

    #[error("cell `{cell}` is not visible")]
    NotVisible { cell: String },

    #[error("cell `{cell}` is not attached to a container")]
    NotAttached { cell: String },

    #[error("cell `{cell}` belongs to a different container")]
    ForeignContainer { cell: String },

    #[error("focus changed from inside a focus change handler")]
    ReentrantFocusChange,
}

/// Result type for fallible tree operations.
pub type Result<T> = std::result::Result<T, CellError>;

/// Report a contract violation found inside an infallible operation.
#[track_caller]
pub(crate) fn fatal(err: CellError) -> ! {
    error!(error = %err, "cell tree usage error");
    panic!("{err}");
}
