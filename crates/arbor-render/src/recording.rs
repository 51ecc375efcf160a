//! A software painter that records what was drawn.
//!
//! [`RecordingPainter`] keeps the full painter state machine (save stack,
//! accumulated translation, clip) and appends every visible fill to a
//! command list in device pixels. It backs headless windows and lets tests
//! assert exactly where a subtree painted.

use crate::buffer::PaintSurface;
use crate::painter::Painter;
use crate::types::{Color, PixelOffset, PixelRect};

/// A recorded drawing operation, in device pixels after translation and clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintCommand {
    /// A solid rectangle fill.
    Fill { rect: PixelRect, color: Color },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PainterState {
    translation: PixelOffset,
    /// Device-space clip. `Some(empty)` clips everything away.
    clip: Option<PixelRect>,
}

/// A painter that records fills instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingPainter {
    scale_factor: f32,
    state: PainterState,
    stack: Vec<PainterState>,
    commands: Vec<PaintCommand>,
    unbalanced_restores: usize,
    presented: Vec<PixelRect>,
}

impl RecordingPainter {
    /// Create an unclipped painter with the given scale factor.
    pub fn new(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            state: PainterState {
                translation: PixelOffset::ZERO,
                clip: None,
            },
            stack: Vec::new(),
            commands: Vec::new(),
            unbalanced_restores: 0,
            presented: Vec::new(),
        }
    }

    /// Create a painter whose initial clip is `clip` (device pixels).
    pub fn with_clip(scale_factor: f32, clip: PixelRect) -> Self {
        let mut painter = Self::new(scale_factor);
        painter.state.clip = Some(clip);
        painter
    }

    /// All recorded commands in draw order.
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Recorded fills as `(device rect, color)` pairs in draw order.
    pub fn fills(&self) -> Vec<(PixelRect, Color)> {
        self.commands
            .iter()
            .map(|command| match command {
                PaintCommand::Fill { rect, color } => (*rect, *color),
            })
            .collect()
    }

    /// The current accumulated translation.
    pub fn translation(&self) -> PixelOffset {
        self.state.translation
    }

    /// The current device-space clip, if any.
    pub fn clip(&self) -> Option<PixelRect> {
        self.state.clip
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of `restore` calls that had no matching `save`.
    pub fn unbalanced_restores(&self) -> usize {
        self.unbalanced_restores
    }

    /// Regions passed to [`PaintSurface::present`], in order.
    pub fn presented(&self) -> &[PixelRect] {
        &self.presented
    }

    /// Drop recorded commands, keeping painter state.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn to_device(&self, rect: PixelRect) -> PixelRect {
        rect + self.state.translation
    }
}

impl Painter for RecordingPainter {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => {
                self.unbalanced_restores += 1;
                tracing::warn!(
                    target: arbor_core::logging::targets::PAINT,
                    "restore without matching save"
                );
            }
        }
    }

    fn translate_pixel(&mut self, offset: PixelOffset) {
        self.state.translation += offset;
    }

    fn clip_rect_pixel(&mut self, rect: PixelRect) {
        let device = self.to_device(rect);
        let clip = match self.state.clip {
            Some(current) => current
                .intersect(&device)
                .unwrap_or(PixelRect::new(device.x(), device.y(), 0, 0)),
            None => device,
        };
        self.state.clip = Some(clip);
    }

    fn fill_pixel_rect(&mut self, rect: PixelRect, color: Color) {
        let device = self.to_device(rect);
        let visible = match self.state.clip {
            Some(clip) => device.intersect(&clip),
            None if device.is_empty() => None,
            None => Some(device),
        };
        if let Some(rect) = visible {
            self.commands.push(PaintCommand::Fill { rect, color });
        }
    }

    fn scale_factor(&self) -> f32 {
        self.scale_factor
    }
}

impl PaintSurface for RecordingPainter {
    fn present(&mut self, dirty: PixelRect) {
        self.presented.push(dirty);
    }
}
