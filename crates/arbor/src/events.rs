//! Pointer and keyboard event types routed through the view tree.
//!
//! Every pointer event carries its position in the receiving view's local
//! pixel space. A container re-expresses the event for a child with
//! [`MouseMoveEvent::offset_by`] (and the matching methods on the other
//! event types) before forwarding it.

use arbor_render::{PixelOffset, PixelPoint};

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Secondary button (usually right).
    Right = 1,
    /// Middle button (scroll wheel click).
    Middle = 2,
    /// Additional button 1 (e.g., browser back).
    Button4 = 3,
    /// Additional button 2 (e.g., browser forward).
    Button5 = 4,
}

impl MouseButton {
    /// The bit for this button in a pressed-buttons mask.
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// What happened to the button of a [`MouseClickEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Press,
    Release,
    DoubleClick,
}

/// Pointer motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoveEvent {
    /// Position in the receiver's local pixels.
    pub position: PixelPoint,
    /// Currently pressed buttons as a bitfield of [`MouseButton::mask`].
    pub pressed_buttons: u8,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MouseMoveEvent {
    pub fn new(position: PixelPoint) -> Self {
        Self {
            position,
            pressed_buttons: 0,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Check if `button` is held.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons & button.mask() != 0
    }

    /// The same event with its position moved by `offset`.
    pub fn offset_by(&self, offset: PixelOffset) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }
}

/// A button press, release or double click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseClickEvent {
    pub kind: ClickKind,
    pub button: MouseButton,
    /// Position in the receiver's local pixels.
    pub position: PixelPoint,
    pub modifiers: KeyboardModifiers,
}

impl MouseClickEvent {
    pub fn new(kind: ClickKind, button: MouseButton, position: PixelPoint) -> Self {
        Self {
            kind,
            button,
            position,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Release of the primary button, which ends any drag.
    pub fn is_primary_release(&self) -> bool {
        self.kind == ClickKind::Release && self.button == MouseButton::Left
    }

    /// The same event with its position moved by `offset`.
    pub fn offset_by(&self, offset: PixelOffset) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }
}

/// Standard wheel delta for one notch.
pub const WHEEL_DELTA: i32 = 120;

/// Wheel rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Vertical wheel when `true`, horizontal otherwise.
    pub vertical: bool,
    /// Rotation in units where one notch is [`WHEEL_DELTA`].
    pub delta: i32,
    /// Position in the receiver's local pixels.
    pub position: PixelPoint,
    pub modifiers: KeyboardModifiers,
}

impl WheelEvent {
    pub fn new(vertical: bool, delta: i32, position: PixelPoint) -> Self {
        Self {
            vertical,
            delta,
            position,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// The same event with its position moved by `offset`.
    pub fn offset_by(&self, offset: PixelOffset) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mask() {
        let event = MouseMoveEvent {
            pressed_buttons: MouseButton::Left.mask() | MouseButton::Middle.mask(),
            ..MouseMoveEvent::new(PixelPoint::ZERO)
        };
        assert!(event.is_pressed(MouseButton::Left));
        assert!(event.is_pressed(MouseButton::Middle));
        assert!(!event.is_pressed(MouseButton::Right));
    }

    #[test]
    fn test_primary_release() {
        let release = MouseClickEvent::new(ClickKind::Release, MouseButton::Left, PixelPoint::ZERO);
        assert!(release.is_primary_release());

        let press = MouseClickEvent::new(ClickKind::Press, MouseButton::Left, PixelPoint::ZERO);
        assert!(!press.is_primary_release());

        let right = MouseClickEvent::new(ClickKind::Release, MouseButton::Right, PixelPoint::ZERO);
        assert!(!right.is_primary_release());
    }

    #[test]
    fn test_offset_by_keeps_other_fields() {
        let event = WheelEvent {
            modifiers: KeyboardModifiers::SHIFT,
            ..WheelEvent::new(true, -WHEEL_DELTA, PixelPoint::new(60, 10))
        };
        let local = event.offset_by(PixelOffset::new(-50, 0));
        assert_eq!(local.position, PixelPoint::new(10, 10));
        assert_eq!(local.delta, -WHEEL_DELTA);
        assert_eq!(local.modifiers, KeyboardModifiers::SHIFT);
    }

    #[test]
    fn test_modifiers_any() {
        assert!(!KeyboardModifiers::NONE.any());
        assert!(KeyboardModifiers::CTRL.any());
    }
}
