//! Basic geometry and color types for painting.
//!
//! Two coordinate systems coexist. Pixel types (`PixelPoint`, `PixelSize`,
//! `PixelOffset`, `PixelRect`) are integer device pixels and are what the
//! view tree routes and clips with. Logical types (`Point`, `Size`, `Rect`)
//! are device pixels divided by the window's scale factor and are what
//! application-facing accessors return.

use std::ops::{Add, AddAssign, Neg, Sub};

/// A point in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// A size in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Check if the size is empty (zero or negative area).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A rectangle in logical coordinates, defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Check if the rectangle is empty (zero or negative size).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check if a point is inside the rectangle.
    ///
    /// The right and bottom edges are exclusive.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Compute the intersection of two rectangles.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Offset the rectangle by the given amount.
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.origin.x + dx, self.origin.y + dy, self.width(), self.height())
    }

    /// Multiply origin and size by `factor`.
    #[inline]
    pub fn scale(&self, factor: f32) -> Rect {
        Rect::new(
            self.origin.x * factor,
            self.origin.y * factor,
            self.size.width * factor,
            self.size.height * factor,
        )
    }

    /// The smallest pixel rectangle that covers this rectangle.
    ///
    /// The origin is floored and the far edges are ceiled, so a fractional
    /// logical rectangle never loses coverage when converted to pixels.
    pub fn to_enclosing_pixel_rect(&self) -> PixelRect {
        let left = self.left().floor() as i32;
        let top = self.top().floor() as i32;
        let right = self.right().ceil() as i32;
        let bottom = self.bottom().ceil() as i32;
        PixelRect::new(left, top, right - left, bottom - top)
    }
}

impl From<PixelRect> for Rect {
    fn from(rect: PixelRect) -> Self {
        Rect::new(
            rect.x() as f32,
            rect.y() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }
}

/// Scale a logical or pixel rectangle by `factor`.
///
/// Dividing by the scale factor (`1.0 / scale`) takes pixels to logical
/// units; multiplying takes logical units back to pixels.
#[inline]
pub fn scale_rect(rect: impl Into<Rect>, factor: f32) -> Rect {
    rect.into().scale(factor)
}

/// A displacement in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelOffset {
    pub dx: i32,
    pub dy: i32,
}

impl PixelOffset {
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub const ZERO: Self = Self { dx: 0, dy: 0 };
}

impl Add for PixelOffset {
    type Output = PixelOffset;

    fn add(self, rhs: PixelOffset) -> PixelOffset {
        PixelOffset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for PixelOffset {
    fn add_assign(&mut self, rhs: PixelOffset) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Neg for PixelOffset {
    type Output = PixelOffset;

    fn neg(self) -> PixelOffset {
        PixelOffset::new(-self.dx, -self.dy)
    }
}

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// The offset from (0, 0) to this point.
    #[inline]
    pub const fn offset_from_origin(&self) -> PixelOffset {
        PixelOffset::new(self.x, self.y)
    }
}

impl Add<PixelOffset> for PixelPoint {
    type Output = PixelPoint;

    fn add(self, rhs: PixelOffset) -> PixelPoint {
        PixelPoint::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub<PixelOffset> for PixelPoint {
    type Output = PixelPoint;

    fn sub(self, rhs: PixelOffset) -> PixelPoint {
        PixelPoint::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

impl Sub for PixelPoint {
    type Output = PixelOffset;

    fn sub(self, rhs: PixelPoint) -> PixelOffset {
        PixelOffset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelSize {
    pub width: i32,
    pub height: i32,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub origin: PixelPoint,
    pub size: PixelSize,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: PixelPoint { x, y },
            size: PixelSize { width, height },
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: PixelSize) -> Self {
        Self {
            origin: PixelPoint::ZERO,
            size,
        }
    }

    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub fn x(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.origin.y
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.height
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// The offset from (0, 0) to this rectangle's origin.
    #[inline]
    pub fn offset_from_origin(&self) -> PixelOffset {
        self.origin.offset_from_origin()
    }

    /// Check if a point is inside the rectangle.
    ///
    /// The right and bottom edges are exclusive, so adjacent rectangles
    /// never both contain the same point.
    #[inline]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x()
            && point.x < self.right()
            && point.y >= self.y()
            && point.y < self.bottom()
    }

    /// Compute the intersection of two rectangles.
    ///
    /// Returns `None` when the overlap covers no pixels.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let left = self.x().max(other.x());
        let top = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(PixelRect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Compute the bounding box of two rectangles.
    ///
    /// An empty rectangle contributes nothing.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.x().min(other.x());
        let top = self.y().min(other.y());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PixelRect::new(left, top, right - left, bottom - top)
    }
}

impl Add<PixelOffset> for PixelRect {
    type Output = PixelRect;

    fn add(self, rhs: PixelOffset) -> PixelRect {
        PixelRect {
            origin: self.origin + rhs,
            size: self.size,
        }
    }
}

impl Sub<PixelOffset> for PixelRect {
    type Output = PixelRect;

    fn sub(self, rhs: PixelOffset) -> PixelRect {
        PixelRect {
            origin: self.origin - rhs,
            size: self.size,
        }
    }
}

/// An RGBA color with premultiplied alpha.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color from premultiplied RGBA components (0.0-1.0 range).
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from non-premultiplied RGBA components.
    #[inline]
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r * a,
            g: g * a,
            b: b * a,
            a,
        }
    }

    /// Create a color from 8-bit RGBA components (0-255 range).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Create an opaque color from RGB components.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit RGB components.
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "#FF0000FF").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let len = hex.len();

        if (len != 6 && len != 8) || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::from_rgba8(r, g, b, a))
    }

    /// Check if the color is fully transparent.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a == 0.0
    }

    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::from_rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::from_rgb(0.0, 0.0, 1.0);
    pub const GRAY: Self = Self::from_rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GRAY: Self = Self::from_rgb(0.75, 0.75, 0.75);
}
