//! Arbor - a retained-mode view tree for desktop windows.
//!
//! A tree of [`View`]s is hosted by a [`TopLevelWindow`]. Interior nodes are
//! [`Container`]s that hit-test, route pointer input to the child under the
//! cursor and paint only the children that intersect the dirty region. The
//! window turns platform messages into those calls, manages mouse capture and
//! tab focus, and double-buffers every paint.
//!
//! # Example
//!
//! ```
//! use arbor::platform::{HeadlessDisplay, WindowMessage};
//! use arbor::{BoxLayout, Panel, TopLevelWindow, WindowOptions};
//!
//! let display = HeadlessDisplay::new();
//! let options = WindowOptions::new("demo");
//! let platform = display.create_window(&options, 1.0);
//! let mut window = TopLevelWindow::new(Box::new(platform), options);
//!
//! let root = Panel::with_name("root");
//! root.set_box_layout(BoxLayout::horizontal(0));
//! root.add_child_view(Panel::with_name("left").view());
//! root.add_child_view(Panel::with_name("right").view());
//! window.set_content_view(root.view());
//!
//! window.handle_message(WindowMessage::Paint);
//! assert_eq!(display.frames().len(), 1);
//! assert_eq!(root.child_at(0).map(|c| c.allocation().x()), Some(0));
//! ```

pub use arbor_core::*;

/// Geometry, colours and painting.
pub mod render {
    pub use arbor_render::*;
}

pub mod container;
pub mod debug;
pub mod error;
pub mod events;
pub mod focus;
pub mod panel;
pub mod platform;
pub mod view;
pub mod window;

pub use container::{Container, ContainerDelegate};
pub use debug::ViewTreeDebug;
pub use error::{ViewError, ViewResult};
pub use events::{
    ClickKind, KeyboardModifiers, MouseButton, MouseClickEvent, MouseMoveEvent, WHEEL_DELTA,
    WheelEvent,
};
pub use focus::{FocusManager, tab_order};
pub use panel::{BoxLayout, Orientation, Panel};
pub use platform::{MessageResult, PlatformWindow, WindowMessage};
pub use view::{View, ViewBase, ViewHandle, ViewNode, WeakViewHandle};
pub use window::{TopLevelWindow, WindowHandle, WindowOptions, WindowStyle};
