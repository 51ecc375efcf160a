//! Window configuration and builder.

use arbor_render::{Color, Rect};

/// Frame style flags used when converting content bounds to window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowStyle {
    /// The window has a title bar and border.
    pub frame: bool,
    /// The border can be dragged to resize.
    pub resizable: bool,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            frame: true,
            resizable: true,
        }
    }
}

/// Configuration for creating a [`TopLevelWindow`](super::TopLevelWindow).
///
/// # Example
///
/// ```
/// use arbor::window::WindowOptions;
/// use arbor_render::{Color, Rect};
///
/// let options = WindowOptions::new("Inspector")
///     .with_bounds(Rect::new(100.0, 100.0, 640.0, 480.0))
///     .with_resizable(false)
///     .with_background_color(Color::LIGHT_GRAY);
///
/// assert_eq!(options.title(), "Inspector");
/// assert!(options.style().frame);
/// assert!(!options.style().resizable);
/// ```
#[derive(Debug, Clone)]
pub struct WindowOptions {
    title: String,
    /// Initial window bounds in logical units, frame included.
    bounds: Rect,
    style: WindowStyle,
    background_color: Color,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl WindowOptions {
    /// Create options with the given title, a framed resizable style and a
    /// white background.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bounds: Rect::ZERO,
            style: WindowStyle::default(),
            background_color: Color::WHITE,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window bounds in logical units.
    ///
    /// Empty bounds leave the platform's default placement alone.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set whether the window has a title bar and border.
    pub fn with_frame(mut self, frame: bool) -> Self {
        self.style.frame = frame;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.style.resizable = resizable;
        self
    }

    /// Set the color painted behind the content view.
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn style(&self) -> WindowStyle {
        self.style
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }
}
