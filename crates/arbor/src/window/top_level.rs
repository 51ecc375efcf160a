//! The window that hosts one view tree.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use arbor_core::logging::{span_names, targets};
use arbor_core::{PerfSpan, Signal};
use arbor_render::{
    Color, DoubleBuffer, Painter, PainterScope, PixelRect, PixelSize, Rect, scale_rect,
};

use super::config::WindowOptions;
use super::handle::{WindowHandle, WindowShared};
use crate::events::{KeyboardModifiers, MouseClickEvent, MouseMoveEvent, WheelEvent};
use crate::focus::FocusManager;
use crate::platform::{ChildWindowId, MessageResult, PlatformWindow, WindowMessage};
use crate::view::{ViewHandle, WeakViewHandle};

/// Predicate consulted before a window closes.
pub type ShouldCloseFn = dyn Fn() -> bool;

/// A top-level native window and the root of one view tree.
///
/// Public geometry is in logical units; everything routed into the tree is
/// in device pixels of the client area.
pub struct TopLevelWindow {
    shared: Rc<WindowShared>,
    options: WindowOptions,
    content_view: Option<ViewHandle>,
    background_color: Color,
    mouse_in_window: bool,
    focus_manager: FocusManager,
    should_close: Option<Box<ShouldCloseFn>>,
    on_close: Signal<()>,
    child_windows: HashMap<ChildWindowId, WeakViewHandle>,
}

impl TopLevelWindow {
    /// Wrap `platform`, applying the configured bounds (when non-empty) and
    /// background color.
    pub fn new(platform: Box<dyn PlatformWindow>, options: WindowOptions) -> Self {
        let window = Self {
            shared: Rc::new(WindowShared::new(platform)),
            background_color: options.background_color(),
            options,
            content_view: None,
            mouse_in_window: false,
            focus_manager: FocusManager::new(),
            should_close: None,
            on_close: Signal::new(),
            child_windows: HashMap::new(),
        };
        let bounds = window.options.bounds();
        if !bounds.is_empty() {
            window.set_bounds(bounds);
        }
        tracing::debug!(target: targets::WINDOW, title = window.options.title(), "window created");
        window
    }

    /// A weak handle for views in this window's tree.
    pub fn handle(&self) -> WindowHandle {
        WindowHandle::new(&self.shared)
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn content_view(&self) -> Option<&ViewHandle> {
        self.content_view.as_ref()
    }

    /// Make `view` the root of the tree and size it to the client area.
    ///
    /// A previous content view is detached from the window.
    pub fn set_content_view(&mut self, view: ViewHandle) {
        if let Some(old) = self.content_view.take() {
            old.set_parent(None);
        }
        view.become_content_view(&self.handle());
        let size = self.content_pixel_bounds().size;
        view.size_allocate(PixelRect::from_size(size));
        self.content_view = Some(view);
        self.shared.invalidate(None, true);
    }

    // Geometry

    pub fn scale_factor(&self) -> f32 {
        self.shared.scale_factor()
    }

    fn to_logical(&self, rect: PixelRect) -> Rect {
        scale_rect(rect, 1.0 / self.scale_factor())
    }

    fn to_pixels(&self, rect: Rect) -> PixelRect {
        rect.scale(self.scale_factor()).to_enclosing_pixel_rect()
    }

    /// Move and resize the window, frame included, in device pixels.
    ///
    /// The content view is re-allocated when the client size changes, as a
    /// native resize would.
    pub fn set_pixel_bounds(&self, bounds: PixelRect) {
        self.set_bounds_inner(bounds);
        self.sync_content_size();
    }

    fn set_bounds_inner(&self, bounds: PixelRect) {
        self.shared
            .with_platform_mut(|platform| platform.set_pixel_bounds(bounds));
    }

    pub fn pixel_bounds(&self) -> PixelRect {
        self.shared.with_platform(|platform| platform.pixel_bounds())
    }

    /// Client area in screen device pixels.
    pub fn content_pixel_bounds(&self) -> PixelRect {
        self.shared
            .with_platform(|platform| platform.client_pixel_bounds())
    }

    /// Set the window bounds, frame included, in logical units.
    pub fn set_bounds(&self, bounds: Rect) {
        self.set_bounds_inner(self.to_pixels(bounds));
        self.sync_content_size();
    }

    pub fn bounds(&self) -> Rect {
        self.to_logical(self.pixel_bounds())
    }

    /// Size the window so its client area covers `bounds` (logical units).
    pub fn set_content_bounds(&self, bounds: Rect) {
        let content = self.to_pixels(bounds);
        let style = self.options.style();
        let window = self
            .shared
            .with_platform(|platform| platform.adjust_window_rect(content, style));
        self.set_bounds_inner(window);
        self.sync_content_size();
    }

    pub fn content_bounds(&self) -> Rect {
        self.to_logical(self.content_pixel_bounds())
    }

    /// Re-allocate the content view if the client size no longer matches.
    fn sync_content_size(&self) {
        let size = self.content_pixel_bounds().size;
        if let Some(content) = &self.content_view {
            if content.allocation().size != size {
                self.resize_content(content, size);
            }
        }
    }

    fn resize_content(&self, content: &ViewHandle, size: PixelSize) {
        content.size_allocate(PixelRect::from_size(size));
        self.shared.invalidate(None, true);
    }

    // Visibility and appearance

    /// Show without activating, or hide.
    pub fn set_visible(&self, visible: bool) {
        self.shared
            .with_platform_mut(|platform| platform.set_visible(visible));
    }

    pub fn is_visible(&self) -> bool {
        self.shared.with_platform(|platform| platform.is_visible())
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
        self.shared.invalidate(None, false);
    }

    // Close

    /// Consulted on every close request; returning `false` cancels it.
    pub fn set_should_close(&mut self, predicate: impl Fn() -> bool + 'static) {
        self.should_close = Some(Box::new(predicate));
    }

    /// Emitted when a close request is allowed.
    pub fn on_close(&self) -> &Signal<()> {
        &self.on_close
    }

    /// Run the close-request path programmatically.
    pub fn close(&mut self) -> bool {
        self.on_close_request()
    }

    // Capture

    /// Route all pointer input to `view` until released.
    pub fn set_capture(&self, view: &ViewHandle) {
        self.shared.set_capture(view.downgrade());
    }

    /// Release capture if this window holds it.
    pub fn release_capture(&self) {
        self.shared.release_capture();
    }

    pub fn capture_view(&self) -> Option<ViewHandle> {
        self.shared.capture_view()
    }

    // Focus

    pub fn focus_manager(&self) -> &FocusManager {
        &self.focus_manager
    }

    pub fn focus_manager_mut(&mut self) -> &mut FocusManager {
        &mut self.focus_manager
    }

    /// Whether the pointer has entered the client area and not left it.
    pub fn mouse_in_window(&self) -> bool {
        self.mouse_in_window
    }

    // Child windows

    /// Route command and control-color notifications from `id` to `view`.
    pub fn register_child_window(&mut self, id: ChildWindowId, view: &ViewHandle) {
        self.child_windows.insert(id, view.downgrade());
    }

    pub fn unregister_child_window(&mut self, id: ChildWindowId) -> bool {
        self.child_windows.remove(&id).is_some()
    }

    fn child_window_view(&self, id: ChildWindowId) -> Option<ViewHandle> {
        let view = self.child_windows.get(&id).and_then(|weak| weak.upgrade());
        if view.is_none() {
            tracing::error!(
                target: targets::WINDOW,
                ?id,
                "notification from an unknown child window"
            );
        }
        view
    }

    // Inbound notifications

    /// Dispatch one platform notification.
    pub fn handle_message(&mut self, message: WindowMessage) -> MessageResult {
        fn handled(consumed: bool) -> MessageResult {
            if consumed {
                MessageResult::Handled
            } else {
                MessageResult::Unhandled
            }
        }

        match message {
            WindowMessage::Resized(size) => {
                self.on_size(size);
                MessageResult::Handled
            }
            WindowMessage::ScaleFactorChanged { scale_factor } => {
                self.on_scale_factor_changed(scale_factor);
                MessageResult::Handled
            }
            WindowMessage::MouseMove(event) => {
                self.on_mouse_move(&event);
                MessageResult::Handled
            }
            WindowMessage::MouseLeave => {
                self.on_mouse_leave();
                MessageResult::Handled
            }
            WindowMessage::MouseWheel(event) => handled(self.on_mouse_wheel(&event)),
            WindowMessage::MouseClick(event) => handled(self.on_mouse_click(&event)),
            WindowMessage::Char { ch, modifiers } => handled(self.on_char(ch, modifiers)),
            WindowMessage::Paint => {
                self.on_paint();
                MessageResult::Handled
            }
            WindowMessage::EraseBackground => self.on_erase_background(),
            WindowMessage::CaptureChanged => {
                self.on_capture_changed();
                MessageResult::Handled
            }
            WindowMessage::Close => handled(self.on_close_request()),
            WindowMessage::Command {
                source,
                code,
                command,
            } => {
                self.on_command(source, code, command);
                MessageResult::Handled
            }
            WindowMessage::ControlColor { source } => match self.on_control_color(source) {
                Some(color) => MessageResult::ControlColor(color),
                None => MessageResult::Unhandled,
            },
        }
    }

    /// The client area changed size.
    pub fn on_size(&mut self, size: PixelSize) {
        let Some(content) = &self.content_view else {
            return;
        };
        tracing::debug!(
            target: targets::WINDOW,
            width = size.width,
            height = size.height,
            "resized"
        );
        self.resize_content(content, size);
    }

    /// The window now renders at `scale_factor` device pixels per logical
    /// unit.
    ///
    /// Views read the scale through the tree, so re-rooting the content view
    /// and laying it out again is enough for logical bounds to follow.
    pub fn on_scale_factor_changed(&mut self, scale_factor: f32) {
        tracing::debug!(target: targets::WINDOW, scale_factor, "scale factor changed");
        self.shared.set_scale_factor(scale_factor);
        if let Some(content) = &self.content_view {
            content.become_content_view(&self.handle());
            let size = self.content_pixel_bounds().size;
            content.size_allocate(PixelRect::from_size(size));
        }
        self.shared.invalidate(None, true);
    }

    /// Pointer motion at a client position.
    pub fn on_mouse_move(&mut self, event: &MouseMoveEvent) {
        if !self.mouse_in_window {
            self.mouse_in_window = true;
            self.shared
                .with_platform_mut(|platform| platform.track_mouse_leave(true));
            if let Some(content) = &self.content_view {
                content.mouse_enter();
            }
        }

        if let Some(capture) = self.shared.capture_view() {
            let local = event.offset_by(-capture.node().window_origin().offset_from_origin());
            capture.mouse_move(&local);
            return;
        }

        if let Some(content) = &self.content_view {
            let local = event.offset_by(-content.node().window_origin().offset_from_origin());
            content.mouse_move(&local);
        }
    }

    pub fn on_mouse_leave(&mut self) {
        self.shared
            .with_platform_mut(|platform| platform.track_mouse_leave(false));
        self.mouse_in_window = false;
        if let Some(content) = &self.content_view {
            content.mouse_leave();
        }
    }

    /// Wheel rotation at a screen position.
    pub fn on_mouse_wheel(&mut self, event: &WheelEvent) -> bool {
        let Some(content) = &self.content_view else {
            return false;
        };
        let client = self
            .shared
            .with_platform(|platform| platform.screen_to_client(event.position));
        let local = content.node().from_window(client);
        content.mouse_wheel(&WheelEvent {
            position: local,
            ..*event
        })
    }

    /// A button press, release or double click at a client position.
    ///
    /// A primary-button release ends any capture, whoever holds it.
    pub fn on_mouse_click(&mut self, event: &MouseClickEvent) -> bool {
        let target = self
            .shared
            .capture_view()
            .or_else(|| self.content_view.clone());
        let consumed = match target {
            Some(view) => {
                let local = event.offset_by(-view.node().window_origin().offset_from_origin());
                view.mouse_click(&local)
            }
            None => false,
        };

        if event.is_primary_release() {
            self.shared.release_capture();
        }
        consumed
    }

    /// A typed character. Only tab is handled: it moves focus, backwards
    /// with shift held.
    pub fn on_char(&mut self, ch: char, modifiers: KeyboardModifiers) -> bool {
        if ch != '\t' {
            return false;
        }
        match &self.content_view {
            Some(content) => {
                self.focus_manager.advance_focus(content, modifiers.shift);
                true
            }
            None => false,
        }
    }

    /// Repaint the invalid region through an off-screen buffer.
    pub fn on_paint(&mut self) {
        let _perf = PerfSpan::new(span_names::PAINT);
        let dirty = self.shared.with_platform_mut(|platform| platform.begin_paint());
        match dirty {
            Some(dirty) if !dirty.is_empty() => self.paint_region(dirty),
            _ => tracing::trace!(target: targets::PAINT, "nothing to paint"),
        }
        self.shared.with_platform_mut(|platform| platform.end_paint());
    }

    fn paint_region(&self, dirty: PixelRect) {
        let size = self.content_pixel_bounds().size;
        let surface = self
            .shared
            .with_platform_mut(|platform| platform.create_paint_surface(size, dirty));
        let surface = match surface {
            Ok(surface) => surface,
            Err(err) => {
                tracing::warn!(target: targets::PAINT, %err, ?dirty, "paint skipped");
                return;
            }
        };

        let mut buffer = DoubleBuffer::new(surface, dirty);
        buffer.fill_pixel_rect(dirty, self.background_color);
        if let Some(content) = &self.content_view {
            if !content.is_visible() {
                return;
            }
            let Some(content_dirty) = content.clipped_rect().intersect(&dirty) else {
                return;
            };
            let origin = content.allocation().offset_from_origin();
            let mut scope = PainterScope::new(&mut buffer);
            scope.translate_pixel(origin);
            content.draw(&mut *scope, content_dirty - origin);
        }
    }

    /// Always handled: the paint pass fills the background itself.
    pub fn on_erase_background(&self) -> MessageResult {
        MessageResult::Handled
    }

    /// Capture was taken away by the platform.
    pub fn on_capture_changed(&mut self) {
        self.shared.capture_changed();
    }

    /// Returns `true` if the close was allowed and [`on_close`](Self::on_close)
    /// emitted.
    pub fn on_close_request(&mut self) -> bool {
        let allowed = self.should_close.as_ref().is_none_or(|predicate| predicate());
        if allowed {
            tracing::debug!(target: targets::WINDOW, "close allowed");
            self.on_close.emit(());
        } else {
            tracing::debug!(target: targets::WINDOW, "close declined");
        }
        allowed
    }

    pub fn on_command(&mut self, source: ChildWindowId, code: u32, command: i32) {
        if let Some(view) = self.child_window_view(source) {
            view.command(code, command);
        }
    }

    pub fn on_control_color(&mut self, source: ChildWindowId) -> Option<Color> {
        self.child_window_view(source)?.control_color()
    }
}

impl fmt::Debug for TopLevelWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopLevelWindow")
            .field("title", &self.options.title())
            .field("content_view", &self.content_view)
            .field("mouse_in_window", &self.mouse_in_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::events::{ClickKind, MouseButton};
    use crate::platform::{HeadlessDisplay, HeadlessProbe};
    use crate::view::{View, ViewBase};
    use arbor_render::PixelPoint;

    struct Leaf {
        base: ViewBase,
        log: Rc<RefCell<Vec<String>>>,
        color: Option<Color>,
    }

    impl View for Leaf {
        fn view_base(&self) -> &ViewBase {
            &self.base
        }

        fn view_base_mut(&mut self) -> &mut ViewBase {
            &mut self.base
        }

        fn on_command(&mut self, code: u32, command: i32) {
            self.log.borrow_mut().push(format!("command {code} {command}"));
        }

        fn on_control_color(&mut self) -> Option<Color> {
            self.color
        }

        fn on_capture_lost(&mut self) {
            self.log.borrow_mut().push("capture lost".into());
        }
    }

    fn window() -> (TopLevelWindow, HeadlessProbe) {
        let display = HeadlessDisplay::new();
        let options = WindowOptions::new("test")
            .with_frame(false)
            .with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0));
        let platform = display.create_window(&options, 1.0);
        let probe = platform.probe();
        (TopLevelWindow::new(Box::new(platform), options), probe)
    }

    fn leaf(log: &Rc<RefCell<Vec<String>>>, color: Option<Color>) -> ViewHandle {
        ViewHandle::new(Leaf {
            base: ViewBase::with_name("leaf"),
            log: log.clone(),
            color,
        })
    }

    #[test]
    fn test_new_applies_bounds() {
        let (window, _) = window();
        assert_eq!(window.pixel_bounds(), PixelRect::new(0, 0, 200, 100));
        assert_eq!(window.bounds(), Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_resize_without_content_is_noop() {
        let (mut window, probe) = window();
        let before = probe.invalidation_count();
        window.on_size(PixelSize::new(10, 10));
        assert_eq!(probe.invalidation_count(), before);
    }

    #[test]
    fn test_close_without_predicate_is_allowed() {
        let (mut window, _) = window();
        assert_eq!(window.handle_message(WindowMessage::Close), MessageResult::Handled);
    }

    #[test]
    fn test_declined_close_is_unhandled() {
        let (mut window, _) = window();
        window.set_should_close(|| false);
        assert_eq!(window.handle_message(WindowMessage::Close), MessageResult::Unhandled);
        assert!(!window.close());
    }

    #[test]
    fn test_erase_background_always_handled() {
        let (mut window, _) = window();
        assert_eq!(
            window.handle_message(WindowMessage::EraseBackground),
            MessageResult::Handled
        );
    }

    #[test]
    fn test_command_routed_by_child_id() {
        let (mut window, _) = window();
        let log = Rc::new(RefCell::new(Vec::new()));
        let view = leaf(&log, Some(Color::GREEN));
        window.register_child_window(ChildWindowId(7), &view);

        window.handle_message(WindowMessage::Command {
            source: ChildWindowId(7),
            code: 1,
            command: 42,
        });
        assert_eq!(*log.borrow(), ["command 1 42"]);
        assert_eq!(
            window.handle_message(WindowMessage::ControlColor {
                source: ChildWindowId(7)
            }),
            MessageResult::ControlColor(Color::GREEN)
        );
    }

    #[test]
    fn test_unknown_child_is_ignored() {
        let (mut window, _) = window();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let view = leaf(&log, None);
            window.register_child_window(ChildWindowId(1), &view);
        }
        window.on_command(ChildWindowId(1), 0, 0);
        window.on_command(ChildWindowId(99), 0, 0);
        assert!(log.borrow().is_empty());
        assert_eq!(window.on_control_color(ChildWindowId(99)), None);
        assert!(window.unregister_child_window(ChildWindowId(1)));
    }

    #[test]
    fn test_primary_release_releases_capture() {
        let (mut window, probe) = window();
        let log = Rc::new(RefCell::new(Vec::new()));
        let view = leaf(&log, None);
        window.set_content_view(view.clone());
        window.set_capture(&view);
        assert!(probe.has_capture());

        let release =
            MouseClickEvent::new(ClickKind::Release, MouseButton::Left, PixelPoint::new(5, 5));
        window.on_mouse_click(&release);
        assert!(!probe.has_capture());
        assert!(window.capture_view().is_none());
        assert_eq!(*log.borrow(), ["capture lost"]);

        // With nothing captured the release is a no-op.
        window.on_mouse_click(&release);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_scale_change_updates_logical_geometry() {
        let (mut window, probe) = window();
        let log = Rc::new(RefCell::new(Vec::new()));
        let view = leaf(&log, None);
        window.set_content_view(view.clone());
        assert_eq!(view.node().bounds(), Rect::new(0.0, 0.0, 200.0, 100.0));

        let before = probe.invalidation_count();
        let result =
            window.handle_message(WindowMessage::ScaleFactorChanged { scale_factor: 2.0 });
        assert_eq!(result, MessageResult::Handled);
        assert_eq!(window.scale_factor(), 2.0);
        assert_eq!(view.node().scale_factor(), 2.0);
        assert_eq!(view.node().bounds(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(window.content_bounds(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(probe.invalidation_count(), before + 1);
        assert_eq!(probe.last_invalidation(), Some((None, true)));
    }

    #[test]
    fn test_capture_dropped_when_view_leaves_window() {
        let (mut window, probe) = window();
        let log = Rc::new(RefCell::new(Vec::new()));
        let view = leaf(&log, None);
        window.set_content_view(view.clone());
        window.set_capture(&view);
        assert!(probe.has_capture());

        let other = leaf(&log, None);
        window.set_content_view(other);
        assert!(window.capture_view().is_none());
        assert!(!probe.has_capture());
        assert_eq!(*log.borrow(), ["capture lost"]);
    }

    #[test]
    fn test_tab_without_content_is_unhandled() {
        let (mut window, _) = window();
        assert!(!window.on_char('\t', KeyboardModifiers::NONE));
        assert!(!window.on_char('a', KeyboardModifiers::NONE));
    }
}
