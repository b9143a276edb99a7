use std::collections::HashSet;

use crate::coords::Vec2;
use crate::id::PointerId;

use super::types::{Modifiers, MouseButton, RawPointerEvent, RawPointerKind};

/// Platform-side input the runtime feeds into [`PointerState::apply`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlatformInput {
    Pointer(RawPointerEvent),
    ModifiersChanged(Modifiers),
    /// Cursor left the window.
    PointerLeft,
    /// Window focus change.
    Focused(bool),
}

/// Current pointer state for a single window.
///
/// Tracks the cursor position, modifiers and held buttons/touches so that platform events which
/// lack them (button presses carry no position in winit) can be completed, and so that several
/// held mouse buttons collapse into one press of the mouse pointer.
#[derive(Debug, Default)]
pub struct PointerState {
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Cursor position in logical pixels.
    pub cursor: Option<Vec2>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,

    /// Touch contacts currently down.
    pub touches: HashSet<PointerId>,
}

impl PointerState {
    /// Applies one platform input and returns the pointer events to dispatch.
    pub fn apply(&mut self, input: PlatformInput) -> Vec<RawPointerEvent> {
        match input {
            PlatformInput::ModifiersChanged(m) => {
                self.modifiers = m;
                Vec::new()
            }

            PlatformInput::PointerLeft => {
                self.cursor = None;
                Vec::new()
            }

            PlatformInput::Focused(true) => {
                self.focused = true;
                Vec::new()
            }

            PlatformInput::Focused(false) => {
                // On focus loss, cancel held pointers so no press gets stuck.
                self.focused = false;
                self.release_all(0.0)
            }

            PlatformInput::Pointer(ev) => self.apply_pointer(ev.with_modifiers(self.modifiers)),
        }
    }

    fn apply_pointer(&mut self, ev: RawPointerEvent) -> Vec<RawPointerEvent> {
        let is_mouse = ev.pointer == PointerId::MOUSE;
        if is_mouse {
            self.cursor = Some(ev.screen);
        }

        match ev.kind {
            RawPointerKind::Down(button) if is_mouse => {
                let first = self.buttons_down.is_empty();
                self.buttons_down.insert(button);
                if first { vec![ev] } else { Vec::new() }
            }
            RawPointerKind::Up(button) if is_mouse => {
                let removed = self.buttons_down.remove(&button);
                if !removed || self.buttons_down.is_empty() {
                    vec![ev]
                } else {
                    Vec::new()
                }
            }
            RawPointerKind::Cancel if is_mouse => {
                self.buttons_down.clear();
                vec![ev]
            }
            RawPointerKind::Down(_) => {
                self.touches.insert(ev.pointer);
                vec![ev]
            }
            RawPointerKind::Up(_) | RawPointerKind::Cancel => {
                self.touches.remove(&ev.pointer);
                vec![ev]
            }
            RawPointerKind::Move | RawPointerKind::Wheel(_) => vec![ev],
        }
    }

    /// Cancels every held pointer.
    pub fn release_all(&mut self, timestamp_ms: f64) -> Vec<RawPointerEvent> {
        let mut out = Vec::new();
        if !self.buttons_down.is_empty() {
            self.buttons_down.clear();
            let at = self.cursor.unwrap_or(Vec2::ZERO);
            out.push(RawPointerEvent::cancel(PointerId::MOUSE, at, timestamp_ms));
        }
        let mut touches: Vec<PointerId> = self.touches.drain().collect();
        touches.sort();
        for touch in touches {
            out.push(RawPointerEvent::cancel(touch, self.cursor.unwrap_or(Vec2::ZERO), timestamp_ms));
        }
        out
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}
