//! Error types for the view tree.

use thiserror::Error;

/// Structural misuse detected while dispatching into the view tree.
///
/// None of these are fatal. Callers on the routing path log them and carry
/// on as if the target had ignored the event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The view is already borrowed further up the call stack, so the call
    /// would re-enter it.
    #[error("view `{view}` is busy; skipped re-entrant {operation}")]
    Busy {
        view: String,
        operation: &'static str,
    },

    /// The view is not attached to a live window.
    #[error("view `{view}` is not attached to a window")]
    Detached { view: String },
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
