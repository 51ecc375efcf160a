//! The boundary with the host windowing system.
//!
//! [`PlatformWindow`] is the outbound side: the calls a
//! [`TopLevelWindow`](crate::window::TopLevelWindow) issues against its native
//! window. [`WindowMessage`] is the inbound side: the notifications the
//! message pump delivers, already decoded into pixel units.
//!
//! Two implementations ship with the crate:
//!
//! - [`headless`]: an in-memory window that records what it is asked to do,
//!   used by tests and offscreen hosts.
//! - [`winit_input`]: translation of `winit` window events into
//!   [`WindowMessage`]s.

pub mod headless;
pub mod winit_input;

use arbor_render::{Color, PaintSurface, PixelPoint, PixelRect, PixelSize, RenderResult};

use crate::events::{KeyboardModifiers, MouseClickEvent, MouseMoveEvent, WheelEvent};
use crate::window::WindowStyle;

pub use headless::{HeadlessDisplay, HeadlessPlatform, HeadlessProbe, PresentedFrame};
pub use winit_input::WinitInputState;

/// Identity of a native child window hosted inside a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildWindowId(pub u64);

/// Operations a top-level window needs from its native window.
///
/// All rectangles are raw device pixels. Bounds are screen coordinates;
/// paint and invalidation rectangles are client coordinates.
pub trait PlatformWindow {
    /// Move and resize the window without activating it or changing its
    /// z-order.
    fn set_pixel_bounds(&mut self, bounds: PixelRect);

    /// Window bounds including the frame.
    fn pixel_bounds(&self) -> PixelRect;

    /// Client area bounds, in screen coordinates.
    fn client_pixel_bounds(&self) -> PixelRect;

    /// Grow a client rectangle by the frame a window of `style` would have.
    fn adjust_window_rect(&self, content: PixelRect, style: WindowStyle) -> PixelRect;

    fn screen_to_client(&self, point: PixelPoint) -> PixelPoint;

    fn scale_factor(&self) -> f32;

    /// Record the scale the system now reports for this window.
    fn set_scale_factor(&mut self, scale_factor: f32);

    /// Request exclusive pointer delivery.
    fn set_capture(&mut self);

    fn release_capture(&mut self);

    /// Whether this window currently holds pointer capture.
    fn has_capture(&self) -> bool;

    /// Mark `rect` (or the whole client area) for repaint.
    fn invalidate(&mut self, rect: Option<PixelRect>, all_children: bool);

    /// Start a paint pass, returning the invalid rectangle to repaint.
    fn begin_paint(&mut self) -> Option<PixelRect>;

    fn end_paint(&mut self);

    /// Create an off-screen surface for one paint pass.
    fn create_paint_surface(
        &mut self,
        size: PixelSize,
        dirty: PixelRect,
    ) -> RenderResult<Box<dyn PaintSurface>>;

    /// Ask for (or stop asking for) a leave notification when the pointer
    /// exits the client area.
    fn track_mouse_leave(&mut self, enable: bool);

    /// Show without activation, or hide.
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

/// Inbound notifications from the message pump.
///
/// Pointer positions are client pixels, except [`WindowMessage::MouseWheel`]
/// which carries screen pixels as native wheel messages do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMessage {
    Resized(PixelSize),
    /// The window moved to a display with a different scale factor.
    ScaleFactorChanged { scale_factor: f32 },
    MouseMove(MouseMoveEvent),
    MouseLeave,
    MouseWheel(WheelEvent),
    MouseClick(MouseClickEvent),
    Char { ch: char, modifiers: KeyboardModifiers },
    Paint,
    EraseBackground,
    CaptureChanged,
    Close,
    Command {
        source: ChildWindowId,
        code: u32,
        command: i32,
    },
    ControlColor { source: ChildWindowId },
}

/// How a [`WindowMessage`] was handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageResult {
    /// Fully handled; the platform default must not run.
    Handled,
    /// Left to the platform default.
    Unhandled,
    /// Handled, answering with a background color for a child control.
    ControlColor(Color),
}

impl MessageResult {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}
