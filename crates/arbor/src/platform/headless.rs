//! An in-memory platform.
//!
//! [`HeadlessDisplay`] stands in for the screen: it hands out window ids,
//! owns the one screen-wide pointer capture and collects every presented
//! frame. [`HeadlessPlatform`] is a [`PlatformWindow`] on that display whose
//! paint surfaces are [`RecordingPainter`]s, so a test can assert exactly
//! which pixels a paint pass touched.
//!
//! Each platform window hands out a [`HeadlessProbe`] that reads back what
//! the window was asked to do.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::logging::targets;
use arbor_render::{
    Color, DamageTracker, PaintCommand, PaintSurface, Painter, PixelOffset, PixelPoint, PixelRect,
    PixelSize, RecordingPainter, RenderError, RenderResult,
};

use super::PlatformWindow;
use crate::window::{WindowOptions, WindowStyle};

/// Bounds a new headless window starts with.
pub const DEFAULT_BOUNDS: PixelRect = PixelRect::new(0, 0, 640, 480);

/// Height of the title bar of a framed window, in pixels.
pub const TITLE_BAR_HEIGHT: i32 = 24;

/// Border width of a framed window that cannot be resized.
pub const BORDER_WIDTH: i32 = 1;

/// Border width of a framed, resizable window.
pub const RESIZE_BORDER_WIDTH: i32 = 4;

/// One paint pass that reached the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub window: u64,
    /// Region that was composited, in client pixels.
    pub dirty: PixelRect,
    /// Everything drawn into the off-screen surface, in client pixels.
    pub commands: Vec<PaintCommand>,
}

impl PresentedFrame {
    /// Fills as `(rect, color)` pairs in draw order.
    pub fn fills(&self) -> Vec<(PixelRect, Color)> {
        self.commands
            .iter()
            .map(|command| match command {
                PaintCommand::Fill { rect, color } => (*rect, *color),
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct DisplayState {
    next_id: u64,
    capture_owner: Option<u64>,
    frames: Vec<PresentedFrame>,
}

/// A fake screen shared by headless windows.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDisplay {
    state: Rc<RefCell<DisplayState>>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a window with `options`' frame style at [`DEFAULT_BOUNDS`].
    pub fn create_window(&self, options: &WindowOptions, scale_factor: f32) -> HeadlessPlatform {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            state.next_id
        };
        let mut window = WindowState {
            id,
            bounds: DEFAULT_BOUNDS,
            style: options.style(),
            scale_factor,
            visible: false,
            tracking_leave: false,
            damage: DamageTracker::new(),
            invalidation_count: 0,
            last_invalidation: None,
            paint_count: 0,
            painting: false,
        };
        window.sync_viewport();
        tracing::debug!(
            target: targets::PLATFORM,
            id,
            title = options.title(),
            "headless window created"
        );
        HeadlessPlatform {
            state: Rc::new(RefCell::new(window)),
            display: self.clone(),
        }
    }

    /// Id of the window holding pointer capture.
    pub fn capture_owner(&self) -> Option<u64> {
        self.state.borrow().capture_owner
    }

    /// Move capture elsewhere, as another application grabbing the pointer
    /// would.
    pub fn set_capture_owner(&self, owner: Option<u64>) {
        self.state.borrow_mut().capture_owner = owner;
    }

    /// Presented frames, oldest first.
    pub fn frames(&self) -> Vec<PresentedFrame> {
        self.state.borrow().frames.clone()
    }

    /// Presented frames, clearing the list.
    pub fn take_frames(&self) -> Vec<PresentedFrame> {
        std::mem::take(&mut self.state.borrow_mut().frames)
    }
}

#[derive(Debug)]
struct WindowState {
    id: u64,
    bounds: PixelRect,
    style: WindowStyle,
    scale_factor: f32,
    visible: bool,
    tracking_leave: bool,
    damage: DamageTracker,
    invalidation_count: usize,
    last_invalidation: Option<(Option<PixelRect>, bool)>,
    paint_count: usize,
    painting: bool,
}

impl WindowState {
    /// Left, top, right and bottom frame thickness.
    fn insets(&self) -> (i32, i32, i32, i32) {
        frame_insets(self.style)
    }

    fn client_bounds(&self) -> PixelRect {
        let (left, top, right, bottom) = self.insets();
        PixelRect::new(
            self.bounds.x() + left,
            self.bounds.y() + top,
            (self.bounds.width() - left - right).max(0),
            (self.bounds.height() - top - bottom).max(0),
        )
    }

    fn sync_viewport(&mut self) {
        let size = self.client_bounds().size;
        self.damage.set_viewport(PixelRect::from_size(size));
    }
}

fn frame_insets(style: WindowStyle) -> (i32, i32, i32, i32) {
    if !style.frame {
        return (0, 0, 0, 0);
    }
    let border = if style.resizable {
        RESIZE_BORDER_WIDTH
    } else {
        BORDER_WIDTH
    };
    (border, border + TITLE_BAR_HEIGHT, border, border)
}

/// A [`PlatformWindow`] on a [`HeadlessDisplay`].
#[derive(Debug)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<WindowState>>,
    display: HeadlessDisplay,
}

impl HeadlessPlatform {
    pub fn id(&self) -> u64 {
        self.state.borrow().id
    }

    /// A read-back view of this window that outlives handing the platform
    /// to a [`TopLevelWindow`](crate::window::TopLevelWindow).
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
            display: self.display.clone(),
        }
    }
}

impl PlatformWindow for HeadlessPlatform {
    fn set_pixel_bounds(&mut self, bounds: PixelRect) {
        let mut state = self.state.borrow_mut();
        state.bounds = bounds;
        state.sync_viewport();
    }

    fn pixel_bounds(&self) -> PixelRect {
        self.state.borrow().bounds
    }

    fn client_pixel_bounds(&self) -> PixelRect {
        self.state.borrow().client_bounds()
    }

    fn adjust_window_rect(&self, content: PixelRect, style: WindowStyle) -> PixelRect {
        let (left, top, right, bottom) = frame_insets(style);
        PixelRect::new(
            content.x() - left,
            content.y() - top,
            content.width() + left + right,
            content.height() + top + bottom,
        )
    }

    fn screen_to_client(&self, point: PixelPoint) -> PixelPoint {
        point - self.state.borrow().client_bounds().offset_from_origin()
    }

    fn scale_factor(&self) -> f32 {
        self.state.borrow().scale_factor
    }

    fn set_scale_factor(&mut self, scale_factor: f32) {
        self.state.borrow_mut().scale_factor = scale_factor;
    }

    fn set_capture(&mut self) {
        let id = self.id();
        self.display.set_capture_owner(Some(id));
    }

    fn release_capture(&mut self) {
        if self.has_capture() {
            self.display.set_capture_owner(None);
        }
    }

    fn has_capture(&self) -> bool {
        self.display.capture_owner() == Some(self.id())
    }

    fn invalidate(&mut self, rect: Option<PixelRect>, all_children: bool) {
        let mut state = self.state.borrow_mut();
        state.invalidation_count += 1;
        state.last_invalidation = Some((rect, all_children));
        match rect {
            Some(rect) => state.damage.add_damage(rect),
            None => state.damage.invalidate_all(),
        }
    }

    fn begin_paint(&mut self) -> Option<PixelRect> {
        let mut state = self.state.borrow_mut();
        if state.painting {
            tracing::warn!(
                target: targets::PLATFORM,
                id = state.id,
                "begin_paint while already painting"
            );
        }
        state.painting = true;
        state.paint_count += 1;
        state.damage.take()
    }

    fn end_paint(&mut self) {
        self.state.borrow_mut().painting = false;
    }

    fn create_paint_surface(
        &mut self,
        size: PixelSize,
        dirty: PixelRect,
    ) -> RenderResult<Box<dyn PaintSurface>> {
        if size.is_empty() {
            return Err(RenderError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        let clip = dirty
            .intersect(&PixelRect::from_size(size))
            .ok_or(RenderError::EmptyDirtyRegion)?;
        let state = self.state.borrow();
        Ok(Box::new(HeadlessSurface {
            painter: RecordingPainter::with_clip(state.scale_factor, clip),
            window: state.id,
            display: self.display.clone(),
        }))
    }

    fn track_mouse_leave(&mut self, enable: bool) {
        self.state.borrow_mut().tracking_leave = enable;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }
}

/// Off-screen surface that records into the display on present.
struct HeadlessSurface {
    painter: RecordingPainter,
    window: u64,
    display: HeadlessDisplay,
}

impl Painter for HeadlessSurface {
    fn save(&mut self) {
        self.painter.save();
    }

    fn restore(&mut self) {
        self.painter.restore();
    }

    fn translate_pixel(&mut self, offset: PixelOffset) {
        self.painter.translate_pixel(offset);
    }

    fn clip_rect_pixel(&mut self, rect: PixelRect) {
        self.painter.clip_rect_pixel(rect);
    }

    fn fill_pixel_rect(&mut self, rect: PixelRect, color: Color) {
        self.painter.fill_pixel_rect(rect, color);
    }

    fn scale_factor(&self) -> f32 {
        self.painter.scale_factor()
    }
}

impl PaintSurface for HeadlessSurface {
    fn present(&mut self, dirty: PixelRect) {
        if self.painter.save_depth() != 0 || self.painter.unbalanced_restores() != 0 {
            tracing::warn!(
                target: targets::PLATFORM,
                depth = self.painter.save_depth(),
                unbalanced = self.painter.unbalanced_restores(),
                "presenting with unbalanced painter state"
            );
        }
        self.display.state.borrow_mut().frames.push(PresentedFrame {
            window: self.window,
            dirty,
            commands: self.painter.commands().to_vec(),
        });
    }
}

/// Read-back access to a [`HeadlessPlatform`].
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<WindowState>>,
    display: HeadlessDisplay,
}

impl HeadlessProbe {
    pub fn id(&self) -> u64 {
        self.state.borrow().id
    }

    pub fn display(&self) -> &HeadlessDisplay {
        &self.display
    }

    pub fn bounds(&self) -> PixelRect {
        self.state.borrow().bounds
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn has_capture(&self) -> bool {
        self.display.capture_owner() == Some(self.id())
    }

    /// Whether the window asked for a leave notification.
    pub fn is_tracking_mouse_leave(&self) -> bool {
        self.state.borrow().tracking_leave
    }

    pub fn invalidation_count(&self) -> usize {
        self.state.borrow().invalidation_count
    }

    /// Arguments of the most recent `invalidate` call.
    pub fn last_invalidation(&self) -> Option<(Option<PixelRect>, bool)> {
        self.state.borrow().last_invalidation
    }

    /// Region the next paint pass will repaint.
    pub fn pending_damage(&self) -> Option<PixelRect> {
        self.state.borrow().damage.damage_region()
    }

    pub fn paint_count(&self) -> usize {
        self.state.borrow().paint_count
    }

    pub fn is_painting(&self) -> bool {
        self.state.borrow().painting
    }

    pub fn scale_factor(&self) -> f32 {
        self.state.borrow().scale_factor
    }

    /// Resize the window behind the toolkit's back, as a user dragging the
    /// frame would. Returns the new client size to deliver as a resize.
    pub fn resize(&self, bounds: PixelRect) -> PixelSize {
        let mut state = self.state.borrow_mut();
        state.bounds = bounds;
        state.sync_viewport();
        state.client_bounds().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(frame: bool) -> (HeadlessDisplay, HeadlessPlatform) {
        let display = HeadlessDisplay::new();
        let options = WindowOptions::new("headless").with_frame(frame);
        let platform = display.create_window(&options, 1.0);
        (display, platform)
    }

    #[test]
    fn test_frame_adjustment_round_trip() {
        let (_display, mut platform) = platform(true);
        let content = PixelRect::new(100, 100, 300, 200);
        let window = platform.adjust_window_rect(content, WindowStyle::default());
        platform.set_pixel_bounds(window);
        assert_eq!(platform.client_pixel_bounds(), content);
    }

    #[test]
    fn test_frameless_client_equals_window() {
        let (_display, platform) = platform(false);
        assert_eq!(platform.client_pixel_bounds(), DEFAULT_BOUNDS);
    }

    #[test]
    fn test_capture_is_screen_wide() {
        let display = HeadlessDisplay::new();
        let options = WindowOptions::default();
        let mut first = display.create_window(&options, 1.0);
        let mut second = display.create_window(&options, 1.0);

        first.set_capture();
        assert!(first.has_capture());
        second.set_capture();
        assert!(!first.has_capture());

        first.release_capture();
        assert!(second.has_capture());
    }

    #[test]
    fn test_scale_factor_change_reaches_surfaces() {
        let (_display, mut platform) = platform(false);
        let probe = platform.probe();
        platform.set_scale_factor(2.0);
        assert_eq!(probe.scale_factor(), 2.0);

        let surface = platform
            .create_paint_surface(PixelSize::new(10, 10), PixelRect::new(0, 0, 10, 10))
            .unwrap();
        assert_eq!(surface.scale_factor(), 2.0);
    }

    #[test]
    fn test_begin_paint_takes_damage() {
        let (_display, mut platform) = platform(false);
        platform.invalidate(Some(PixelRect::new(0, 0, 10, 10)), false);
        platform.invalidate(Some(PixelRect::new(20, 0, 10, 10)), false);
        assert_eq!(platform.begin_paint(), Some(PixelRect::new(0, 0, 30, 10)));
        platform.end_paint();
        assert_eq!(platform.begin_paint(), None);
    }

    #[test]
    fn test_surface_validation() {
        let (_display, mut platform) = platform(false);
        let empty_size =
            platform.create_paint_surface(PixelSize::new(0, 10), PixelRect::new(0, 0, 1, 1));
        assert!(matches!(
            empty_size.err(),
            Some(RenderError::InvalidDimensions { width: 0, height: 10 })
        ));

        let outside =
            platform.create_paint_surface(PixelSize::new(10, 10), PixelRect::new(50, 50, 5, 5));
        assert!(matches!(outside.err(), Some(RenderError::EmptyDirtyRegion)));
    }

    #[test]
    fn test_present_records_frame() {
        let (display, mut platform) = platform(false);
        let dirty = PixelRect::new(0, 0, 20, 20);
        let mut surface = platform
            .create_paint_surface(PixelSize::new(100, 100), dirty)
            .unwrap();
        surface.fill_pixel_rect(PixelRect::new(10, 10, 50, 50), Color::RED);
        surface.present(dirty);

        let frames = display.take_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].window, platform.id());
        assert_eq!(frames[0].fills(), vec![(PixelRect::new(10, 10, 10, 10), Color::RED)]);
        assert!(display.frames().is_empty());
    }
}
