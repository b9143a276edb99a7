//! winit translation.
//!
//! Turns winit `WindowEvent`s into [`PlatformInput`]. Coordinates are converted to logical
//! pixels. The mouse uses [`PointerId::MOUSE`]; touch contacts use their winit id plus one.

use winit::dpi::PhysicalPosition;
use winit::event::{
    ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, Touch, TouchPhase,
    WindowEvent,
};
use winit::keyboard::ModifiersState;
use winit::window::Window;

use crate::coords::Vec2;
use crate::id::PointerId;

use super::state::{PlatformInput, PointerState};
use super::types::{Modifiers, MouseButton, MouseWheelDelta, RawPointerEvent, RawPointerKind};

/// Translates a winit `WindowEvent` into platform input.
///
/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(
    window: &Window,
    state: &PointerState,
    event: &WindowEvent,
    timestamp_ms: f64,
) -> Option<PlatformInput> {
    let raw = |pointer, kind, screen| {
        PlatformInput::Pointer(RawPointerEvent::new(pointer, kind, screen, timestamp_ms))
    };

    match event {
        WindowEvent::ModifiersChanged(m) => {
            // winit 0.30: ModifiersChanged carries a wrapper with `.state()`.
            Some(PlatformInput::ModifiersChanged(map_modifiers(m.state())))
        }

        WindowEvent::Focused(f) => Some(PlatformInput::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(PlatformInput::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(raw(
            PointerId::MOUSE,
            RawPointerKind::Move,
            to_logical(window, *position),
        )),

        WindowEvent::MouseInput { state: st, button, .. } => {
            let button = map_mouse_button(*button);
            let kind = match st {
                ElementState::Pressed => RawPointerKind::Down(button),
                ElementState::Released => RawPointerKind::Up(button),
            };
            // winit 0.30 does not expose cursor query; use tracked pointer position.
            let at = state.cursor.unwrap_or(Vec2::ZERO);
            Some(raw(PointerId::MOUSE, kind, at))
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => {
                    let v = to_logical(window, *p);
                    MouseWheelDelta::Pixel { x: v.x, y: v.y }
                }
            };
            let at = state.cursor.unwrap_or(Vec2::ZERO);
            Some(raw(PointerId::MOUSE, RawPointerKind::Wheel(delta), at))
        }

        WindowEvent::Touch(Touch { id, phase, location, .. }) => {
            let kind = match phase {
                TouchPhase::Started => RawPointerKind::Down(MouseButton::Left),
                TouchPhase::Moved => RawPointerKind::Move,
                TouchPhase::Ended => RawPointerKind::Up(MouseButton::Left),
                TouchPhase::Cancelled => RawPointerKind::Cancel,
            };
            Some(raw(touch_pointer(*id), kind, to_logical(window, *location)))
        }

        _ => None,
    }
}

/// Touch ids are shifted past the mouse; the largest id saturates instead of wrapping onto it.
fn touch_pointer(id: u64) -> PointerId {
    PointerId(id.saturating_add(1))
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> Vec2 {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    Vec2::new(logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}
