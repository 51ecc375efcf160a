//! Painting support for Arbor.
//!
//! This crate provides the geometry and drawing-context capability the view
//! tree is written against:
//!
//! - [`PixelRect`] and friends for raw device-pixel routing, [`Rect`] and
//!   friends for scale-normalized logical coordinates
//! - The [`Painter`] trait with scoped state through [`PainterScope`]
//! - [`DoubleBuffer`], which presents an off-screen [`PaintSurface`] when it
//!   goes out of scope
//! - [`RecordingPainter`], a software painter that records fills in device
//!   pixels, used by headless hosts and tests
//! - [`DamageTracker`] for accumulating invalidated regions
//!
//! # Example
//!
//! ```
//! use arbor_render::{Color, Painter, PainterScope, PixelOffset, PixelRect, RecordingPainter};
//!
//! let mut painter = RecordingPainter::new(1.0);
//! {
//!     let mut scope = PainterScope::new(&mut painter);
//!     scope.translate_pixel(PixelOffset::new(10, 10));
//!     scope.fill_pixel_rect(PixelRect::new(0, 0, 5, 5), Color::RED);
//! }
//! assert_eq!(painter.fills()[0].0, PixelRect::new(10, 10, 5, 5));
//! assert_eq!(painter.save_depth(), 0);
//! ```

pub mod buffer;
pub mod damage;
mod error;
pub mod painter;
pub mod recording;
mod types;

pub use buffer::{DoubleBuffer, PaintSurface};
pub use damage::DamageTracker;
pub use error::{RenderError, RenderResult};
pub use painter::{Painter, PainterScope};
pub use recording::{PaintCommand, RecordingPainter};
pub use types::{
    Color, PixelOffset, PixelPoint, PixelRect, PixelSize, Point, Rect, Size, scale_rect,
};
