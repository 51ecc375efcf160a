//! The drawing-context capability used by the view tree.
//!
//! [`Painter`] is deliberately small: the view tree only ever saves and
//! restores state, translates the origin, narrows the clip, and fills. The
//! pixel-space methods are required; the logical-space methods convert
//! through [`Painter::scale_factor`] and have default implementations.

use std::ops::{Deref, DerefMut};

use crate::types::{Color, PixelOffset, PixelRect, Rect};

/// A stateful 2D drawing context.
///
/// State (translation and clip) is pushed by [`save`](Painter::save) and
/// popped by [`restore`](Painter::restore). Prefer [`PainterScope`] over
/// calling the pair by hand.
pub trait Painter {
    /// Push the current translation and clip.
    fn save(&mut self);

    /// Pop the state pushed by the matching `save`.
    fn restore(&mut self);

    /// Move the origin by `offset` device pixels.
    fn translate_pixel(&mut self, offset: PixelOffset);

    /// Intersect the clip with `rect`, given in current local pixels.
    fn clip_rect_pixel(&mut self, rect: PixelRect);

    /// Fill `rect`, given in current local pixels, with `color`.
    fn fill_pixel_rect(&mut self, rect: PixelRect, color: Color);

    /// Device pixels per logical unit.
    fn scale_factor(&self) -> f32;

    /// Move the origin by a logical offset.
    fn translate(&mut self, dx: f32, dy: f32) {
        let scale = self.scale_factor();
        self.translate_pixel(PixelOffset::new(
            (dx * scale).round() as i32,
            (dy * scale).round() as i32,
        ));
    }

    /// Intersect the clip with a logical rectangle.
    fn clip_rect(&mut self, rect: Rect) {
        let scale = self.scale_factor();
        self.clip_rect_pixel(rect.scale(scale).to_enclosing_pixel_rect());
    }

    /// Fill a logical rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let scale = self.scale_factor();
        self.fill_pixel_rect(rect.scale(scale).to_enclosing_pixel_rect(), color);
    }
}

/// Saves painter state on creation and restores it when dropped.
///
/// Because the restore happens in `Drop`, it also runs while unwinding out
/// of a panicking draw call, so sibling subtrees never inherit a leaked
/// translation or clip.
pub struct PainterScope<'a, P: Painter + ?Sized> {
    painter: &'a mut P,
}

impl<'a, P: Painter + ?Sized> PainterScope<'a, P> {
    /// Save `painter` and guard it until the scope ends.
    pub fn new(painter: &'a mut P) -> Self {
        painter.save();
        Self { painter }
    }
}

impl<P: Painter + ?Sized> Deref for PainterScope<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.painter
    }
}

impl<P: Painter + ?Sized> DerefMut for PainterScope<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.painter
    }
}

impl<P: Painter + ?Sized> Drop for PainterScope<'_, P> {
    fn drop(&mut self) {
        self.painter.restore();
    }
}
