//! Translation of `winit` window events into [`WindowMessage`]s.
//!
//! ```ignore
//! let mut input = WinitInputState::new();
//!
//! // In ApplicationHandler::window_event:
//! if let Some(message) = input.translate(&event) {
//!     window.handle_message(message);
//! }
//! ```

use std::time::{Duration, Instant};

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{
    ElementState, Modifiers, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::{Key, NamedKey};

use arbor_core::logging::targets;
use arbor_render::{PixelPoint, PixelSize};

use super::WindowMessage;
use crate::events::{
    ClickKind, KeyboardModifiers, MouseButton, MouseClickEvent, MouseMoveEvent, WHEEL_DELTA,
    WheelEvent,
};

/// Two presses within this time may form a double click.
pub const DEFAULT_DOUBLE_CLICK_TIME_MS: u64 = 500;

/// Two presses within this distance (pixels) may form a double click.
pub const DEFAULT_DOUBLE_CLICK_DISTANCE: i32 = 5;

/// Pixels scrolled per notch when a platform reports line deltas.
const LINE_DELTA_SCALE: f32 = WHEEL_DELTA as f32;

pub fn from_winit_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Button4),
        WinitMouseButton::Forward => Some(MouseButton::Button5),
        WinitMouseButton::Other(_) => None,
    }
}

pub fn from_winit_modifiers(modifiers: &Modifiers) -> KeyboardModifiers {
    let state = modifiers.state();
    KeyboardModifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

/// Convert a scroll delta to `(vertical, delta)` in [`WHEEL_DELTA`] units.
///
/// Vertical rotation wins when both axes move. Positive is away from the
/// user (up) or to the right.
pub fn wheel_delta_from_winit(delta: MouseScrollDelta) -> (bool, i32) {
    let (x, y) = match delta {
        MouseScrollDelta::LineDelta(x, y) => (x * LINE_DELTA_SCALE, y * LINE_DELTA_SCALE),
        MouseScrollDelta::PixelDelta(position) => (position.x as f32, position.y as f32),
    };
    if y != 0.0 || x == 0.0 {
        (true, y.round() as i32)
    } else {
        (false, x.round() as i32)
    }
}

#[derive(Debug, Clone, Copy)]
struct ClickState {
    button: MouseButton,
    position: PixelPoint,
    time: Instant,
}

/// Pointer and keyboard state needed to decode `winit` events.
#[derive(Debug)]
pub struct WinitInputState {
    position: PixelPoint,
    /// Screen position of the client area's top-left corner.
    client_origin: PixelPoint,
    pressed_buttons: u8,
    modifiers: KeyboardModifiers,
    last_click: Option<ClickState>,
    double_click_time: Duration,
    double_click_distance: i32,
}

impl Default for WinitInputState {
    fn default() -> Self {
        Self::new()
    }
}

impl WinitInputState {
    pub fn new() -> Self {
        Self {
            position: PixelPoint::ZERO,
            client_origin: PixelPoint::ZERO,
            pressed_buttons: 0,
            modifiers: KeyboardModifiers::NONE,
            last_click: None,
            double_click_time: Duration::from_millis(DEFAULT_DOUBLE_CLICK_TIME_MS),
            double_click_distance: DEFAULT_DOUBLE_CLICK_DISTANCE,
        }
    }

    pub fn set_double_click_time(&mut self, duration: Duration) {
        self.double_click_time = duration;
    }

    pub fn set_double_click_distance(&mut self, distance: i32) {
        self.double_click_distance = distance;
    }

    /// Record where the client area sits on screen (for wheel positions).
    pub fn set_client_origin(&mut self, origin: PixelPoint) {
        self.client_origin = origin;
    }

    /// Last pointer position in client pixels.
    pub fn position(&self) -> PixelPoint {
        self.position
    }

    pub fn pressed_buttons(&self) -> u8 {
        self.pressed_buttons
    }

    pub fn modifiers(&self) -> KeyboardModifiers {
        self.modifiers
    }

    pub fn update_modifiers(&mut self, modifiers: KeyboardModifiers) {
        self.modifiers = modifiers;
    }

    /// Decode one event. Events the view tree does not consume yield `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<WindowMessage> {
        match event {
            WindowEvent::Resized(size) => Some(self.handle_resized(*size)),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(self.handle_scale_factor_changed(*scale_factor))
            }
            WindowEvent::CursorMoved { position, .. } => Some(self.handle_cursor_moved(*position)),
            WindowEvent::CursorLeft { .. } => Some(self.handle_cursor_left()),
            WindowEvent::MouseWheel { delta, .. } => Some(self.handle_mouse_wheel(*delta)),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_input(*state, *button)
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = from_winit_modifiers(modifiers);
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return None;
                }
                let ch = match &event.logical_key {
                    Key::Named(NamedKey::Tab) => Some('\t'),
                    _ => event.text.as_ref().and_then(|text| text.chars().next()),
                }?;
                Some(WindowMessage::Char {
                    ch,
                    modifiers: self.modifiers,
                })
            }
            WindowEvent::RedrawRequested => Some(WindowMessage::Paint),
            WindowEvent::CloseRequested => Some(WindowMessage::Close),
            _ => None,
        }
    }

    pub fn handle_resized(&mut self, size: PhysicalSize<u32>) -> WindowMessage {
        WindowMessage::Resized(PixelSize::new(
            i32::try_from(size.width).unwrap_or(i32::MAX),
            i32::try_from(size.height).unwrap_or(i32::MAX),
        ))
    }

    /// The new size winit proposes alongside the scale change is left alone;
    /// a `Resized` event follows if the window actually changes size.
    pub fn handle_scale_factor_changed(&mut self, scale_factor: f64) -> WindowMessage {
        tracing::debug!(target: targets::PLATFORM, scale_factor, "scale factor changed");
        WindowMessage::ScaleFactorChanged {
            scale_factor: scale_factor as f32,
        }
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> WindowMessage {
        self.position = PixelPoint::new(position.x.floor() as i32, position.y.floor() as i32);
        WindowMessage::MouseMove(MouseMoveEvent {
            position: self.position,
            pressed_buttons: self.pressed_buttons,
            modifiers: self.modifiers,
        })
    }

    pub fn handle_cursor_left(&mut self) -> WindowMessage {
        self.last_click = None;
        WindowMessage::MouseLeave
    }

    /// Wheel messages carry screen positions.
    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) -> WindowMessage {
        let (vertical, delta) = wheel_delta_from_winit(delta);
        WindowMessage::MouseWheel(WheelEvent {
            vertical,
            delta,
            position: self.position + self.client_origin.offset_from_origin(),
            modifiers: self.modifiers,
        })
    }

    /// A press that closely follows a press of the same button becomes a
    /// double click.
    pub fn handle_mouse_input(
        &mut self,
        state: ElementState,
        button: WinitMouseButton,
    ) -> Option<WindowMessage> {
        let Some(button) = from_winit_mouse_button(button) else {
            tracing::trace!(target: targets::PLATFORM, ?button, "unmapped mouse button");
            return None;
        };

        let kind = match state {
            ElementState::Pressed => {
                self.pressed_buttons |= button.mask();
                if self.is_double_click(button) {
                    self.last_click = None;
                    ClickKind::DoubleClick
                } else {
                    self.last_click = Some(ClickState {
                        button,
                        position: self.position,
                        time: Instant::now(),
                    });
                    ClickKind::Press
                }
            }
            ElementState::Released => {
                self.pressed_buttons &= !button.mask();
                ClickKind::Release
            }
        };

        Some(WindowMessage::MouseClick(MouseClickEvent {
            kind,
            button,
            position: self.position,
            modifiers: self.modifiers,
        }))
    }

    fn is_double_click(&self, button: MouseButton) -> bool {
        self.last_click.is_some_and(|last| {
            let dx = (self.position.x - last.position.x).abs();
            let dy = (self.position.y - last.position.y).abs();
            last.button == button
                && last.time.elapsed() < self.double_click_time
                && dx.max(dy) <= self.double_click_distance
        })
    }
}
