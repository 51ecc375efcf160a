//! Damage tracking for partial repaint.
//!
//! [`DamageTracker`] accumulates invalidated pixel rectangles into a single
//! bounding rectangle. A paint pass takes the region, draws only inside it,
//! and clears the tracker.
//!
//! # Example
//!
//! ```
//! use arbor_render::{DamageTracker, PixelRect};
//!
//! let mut tracker = DamageTracker::with_viewport(PixelRect::new(0, 0, 200, 200));
//! tracker.add_damage(PixelRect::new(10, 10, 50, 30));
//! tracker.add_damage(PixelRect::new(100, 100, 20, 20));
//!
//! assert_eq!(tracker.take(), Some(PixelRect::new(10, 10, 110, 110)));
//! assert!(!tracker.has_damage());
//! ```

use crate::types::PixelRect;

/// Tracks damaged (dirty) regions that need repainting.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    /// Union of all damage added since the last clear.
    damage: Option<PixelRect>,
    /// Number of non-empty damage rects added since the last clear.
    damage_count: u32,
    /// Whether the whole viewport was invalidated.
    full_repaint: bool,
    /// Bounds that damage is clipped to.
    viewport: Option<PixelRect>,
}

impl DamageTracker {
    /// Create a tracker without a viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that clips damage to `viewport`.
    pub fn with_viewport(viewport: PixelRect) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    /// Set the viewport bounds, typically after a resize.
    pub fn set_viewport(&mut self, viewport: PixelRect) {
        self.viewport = Some(viewport);
        if let Some(damage) = self.damage {
            self.damage = damage.intersect(&viewport);
        }
    }

    /// The viewport bounds.
    pub fn viewport(&self) -> Option<PixelRect> {
        self.viewport
    }

    /// Add a damaged region, unioned with existing damage.
    ///
    /// Empty rects and rects entirely outside the viewport are ignored.
    pub fn add_damage(&mut self, rect: PixelRect) {
        if rect.is_empty() {
            return;
        }

        let rect = match &self.viewport {
            Some(viewport) => match rect.intersect(viewport) {
                Some(clipped) => clipped,
                None => return,
            },
            None => rect,
        };

        self.damage_count += 1;
        self.damage = Some(match self.damage {
            Some(existing) => existing.union(&rect),
            None => rect,
        });
    }

    /// Mark the entire viewport as damaged.
    pub fn invalidate_all(&mut self) {
        self.full_repaint = true;
        self.damage = self.viewport;
        self.damage_count = 1;
    }

    /// The pending damage region, or the viewport after `invalidate_all`.
    pub fn damage_region(&self) -> Option<PixelRect> {
        if self.full_repaint {
            self.viewport
        } else {
            self.damage
        }
    }

    /// Check if any damage has been recorded.
    #[inline]
    pub fn has_damage(&self) -> bool {
        self.damage.is_some() || self.full_repaint
    }

    /// Check if the whole viewport was invalidated.
    #[inline]
    pub fn needs_full_repaint(&self) -> bool {
        self.full_repaint
    }

    /// Number of damage rects added since the last clear.
    #[inline]
    pub fn damage_count(&self) -> u32 {
        self.damage_count
    }

    /// Clear all damage.
    pub fn clear(&mut self) {
        self.damage = None;
        self.damage_count = 0;
        self.full_repaint = false;
    }

    /// Return the pending region and clear the tracker.
    pub fn take(&mut self) -> Option<PixelRect> {
        let region = self.damage_region();
        self.clear();
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tracker() {
        let tracker = DamageTracker::new();
        assert!(!tracker.has_damage());
        assert_eq!(tracker.damage_region(), None);
        assert_eq!(tracker.damage_count(), 0);
    }

    #[test]
    fn test_union_of_damage() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(PixelRect::new(0, 0, 10, 10));
        tracker.add_damage(PixelRect::new(20, 20, 10, 10));
        assert_eq!(tracker.damage_region(), Some(PixelRect::new(0, 0, 30, 30)));
        assert_eq!(tracker.damage_count(), 2);
    }

    #[test]
    fn test_empty_rect_ignored() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(PixelRect::new(5, 5, 0, 10));
        assert!(!tracker.has_damage());
    }

    #[test]
    fn test_damage_clipped_to_viewport() {
        let mut tracker = DamageTracker::with_viewport(PixelRect::new(0, 0, 100, 100));
        tracker.add_damage(PixelRect::new(90, 90, 20, 20));
        assert_eq!(tracker.damage_region(), Some(PixelRect::new(90, 90, 10, 10)));

        tracker.add_damage(PixelRect::new(200, 200, 5, 5));
        assert_eq!(tracker.damage_count(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let viewport = PixelRect::new(0, 0, 640, 480);
        let mut tracker = DamageTracker::with_viewport(viewport);
        tracker.add_damage(PixelRect::new(1, 1, 1, 1));
        tracker.invalidate_all();
        assert!(tracker.needs_full_repaint());
        assert_eq!(tracker.damage_region(), Some(viewport));
    }

    #[test]
    fn test_set_viewport_shrinks_damage() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(PixelRect::new(0, 0, 100, 100));
        tracker.set_viewport(PixelRect::new(0, 0, 50, 40));
        assert_eq!(tracker.damage_region(), Some(PixelRect::new(0, 0, 50, 40)));
    }

    #[test]
    fn test_take_clears() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(PixelRect::new(0, 0, 4, 4));
        assert_eq!(tracker.take(), Some(PixelRect::new(0, 0, 4, 4)));
        assert_eq!(tracker.take(), None);
    }
}
