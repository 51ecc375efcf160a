//! Double-buffered painting.
//!
//! A paint pass draws into an off-screen [`PaintSurface`] wrapped in a
//! [`DoubleBuffer`]. When the buffer goes out of scope the dirty region is
//! presented to the screen in one step, so the window never shows a
//! half-drawn frame, even if a draw call unwinds.

use crate::painter::Painter;
use crate::types::{Color, PixelOffset, PixelRect};

/// An off-screen painter that can copy a region of itself to the screen.
pub trait PaintSurface: Painter {
    /// Composite `dirty` (window client pixels) onto the on-screen surface.
    fn present(&mut self, dirty: PixelRect);
}

/// Owns a paint surface for the duration of one paint call.
///
/// `DoubleBuffer` is itself a [`Painter`] that forwards to the surface.
/// Dropping it presents the dirty rectangle.
pub struct DoubleBuffer {
    surface: Box<dyn PaintSurface>,
    dirty: PixelRect,
}

impl DoubleBuffer {
    /// Wrap `surface`, which will be presented over `dirty` on drop.
    pub fn new(surface: Box<dyn PaintSurface>, dirty: PixelRect) -> Self {
        Self { surface, dirty }
    }

    /// The region that will be presented.
    pub fn dirty(&self) -> PixelRect {
        self.dirty
    }
}

impl Painter for DoubleBuffer {
    fn save(&mut self) {
        self.surface.save();
    }

    fn restore(&mut self) {
        self.surface.restore();
    }

    fn translate_pixel(&mut self, offset: PixelOffset) {
        self.surface.translate_pixel(offset);
    }

    fn clip_rect_pixel(&mut self, rect: PixelRect) {
        self.surface.clip_rect_pixel(rect);
    }

    fn fill_pixel_rect(&mut self, rect: PixelRect, color: Color) {
        self.surface.fill_pixel_rect(rect, color);
    }

    fn scale_factor(&self) -> f32 {
        self.surface.scale_factor()
    }
}

impl Drop for DoubleBuffer {
    fn drop(&mut self) {
        tracing::trace!(
            target: arbor_core::logging::targets::PAINT,
            dirty = ?self.dirty,
            "presenting buffer"
        );
        self.surface.present(self.dirty);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::recording::RecordingPainter;

    /// Surface that hands its recording back through a shared cell.
    struct SharedSurface {
        painter: RecordingPainter,
        sink: Rc<RefCell<Vec<(PixelRect, usize)>>>,
    }

    impl Painter for SharedSurface {
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

    impl PaintSurface for SharedSurface {
        fn present(&mut self, dirty: PixelRect) {
            self.sink.borrow_mut().push((dirty, self.painter.commands().len()));
        }
    }

    #[test]
    fn test_presents_on_drop() {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let dirty = PixelRect::new(0, 0, 100, 20);
        {
            let surface = SharedSurface {
                painter: RecordingPainter::new(1.0),
                sink: sink.clone(),
            };
            let mut buffer = DoubleBuffer::new(Box::new(surface), dirty);
            buffer.fill_pixel_rect(dirty, Color::WHITE);
            assert!(sink.borrow().is_empty());
        }
        assert_eq!(*sink.borrow(), vec![(dirty, 1)]);
    }

    #[test]
    fn test_presents_when_drawing_unwinds() {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let dirty = PixelRect::new(5, 5, 10, 10);
        let surface = SharedSurface {
            painter: RecordingPainter::new(1.0),
            sink: sink.clone(),
        };
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let mut buffer = DoubleBuffer::new(Box::new(surface), dirty);
            buffer.fill_pixel_rect(dirty, Color::WHITE);
            panic!("view failed to draw");
        }));
        assert!(result.is_err());
        assert_eq!(*sink.borrow(), vec![(dirty, 1)]);
    }
}
