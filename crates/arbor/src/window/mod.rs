//! Top-level windows.
//!
//! A [`TopLevelWindow`] owns one native window (through the
//! [`PlatformWindow`](crate::platform::PlatformWindow) boundary) and one
//! content view. It turns inbound [`WindowMessage`](crate::platform::WindowMessage)s
//! into calls on the tree and owns capture, focus traversal and painting.
//!
//! Views reach their window through a [`WindowHandle`], a weak reference
//! that stays valid to hold after the window is gone.
//!
//! ```
//! use arbor::platform::HeadlessDisplay;
//! use arbor::window::{TopLevelWindow, WindowOptions};
//! use arbor_render::Rect;
//!
//! let display = HeadlessDisplay::new();
//! let options = WindowOptions::new("Main")
//!     .with_frame(false)
//!     .with_bounds(Rect::new(0.0, 0.0, 320.0, 240.0));
//! let platform = display.create_window(&options, 1.0);
//! let window = TopLevelWindow::new(Box::new(platform), options);
//!
//! assert_eq!(window.content_bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
//! ```

mod config;
mod handle;
mod top_level;

pub use config::{WindowOptions, WindowStyle};
pub use handle::WindowHandle;
pub(crate) use handle::WindowShared;
pub use top_level::TopLevelWindow;
