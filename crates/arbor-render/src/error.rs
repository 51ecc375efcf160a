//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while acquiring or presenting a paint surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Invalid surface dimensions (zero or negative width or height).
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// The requested dirty region does not cover any pixels.
    #[error("dirty region is empty")]
    EmptyDirtyRegion,

    /// The surface backing the window is no longer available.
    #[error("paint surface lost")]
    SurfaceLost,
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
