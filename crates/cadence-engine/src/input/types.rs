use crate::coords::Vec2;
use crate::id::PointerId;

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys state.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Pixels per scroll line when a line delta has to be expressed in pixels.
    pub const LINE_HEIGHT: f32 = 40.0;

    pub fn to_pixels(self) -> Vec2 {
        match self {
            MouseWheelDelta::Line { x, y } => Vec2::new(x, y) * Self::LINE_HEIGHT,
            MouseWheelDelta::Pixel { x, y } => Vec2::new(x, y),
        }
    }
}

/// What happened to a pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RawPointerKind {
    Down(MouseButton),
    Move,
    Up(MouseButton),
    /// The platform took the pointer away (touch cancel, focus loss).
    Cancel,
    Wheel(MouseWheelDelta),
}

/// Platform-agnostic pointer event in screen pixels.
///
/// Runtime code translates window system events into these; engines route them to their input
/// controls.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawPointerEvent {
    pub pointer: PointerId,
    pub kind: RawPointerKind,
    pub screen: Vec2,
    /// Milliseconds on the platform's monotonic clock. Orders presses for pinch pairing and
    /// drag eviction.
    pub timestamp_ms: f64,
    pub modifiers: Modifiers,
}

impl RawPointerEvent {
    pub fn new(pointer: PointerId, kind: RawPointerKind, screen: Vec2, timestamp_ms: f64) -> Self {
        Self {
            pointer,
            kind,
            screen,
            timestamp_ms,
            modifiers: Modifiers::default(),
        }
    }

    pub fn down(pointer: PointerId, screen: Vec2, timestamp_ms: f64) -> Self {
        Self::new(pointer, RawPointerKind::Down(MouseButton::Left), screen, timestamp_ms)
    }

    pub fn move_to(pointer: PointerId, screen: Vec2, timestamp_ms: f64) -> Self {
        Self::new(pointer, RawPointerKind::Move, screen, timestamp_ms)
    }

    pub fn up(pointer: PointerId, screen: Vec2, timestamp_ms: f64) -> Self {
        Self::new(pointer, RawPointerKind::Up(MouseButton::Left), screen, timestamp_ms)
    }

    pub fn cancel(pointer: PointerId, screen: Vec2, timestamp_ms: f64) -> Self {
        Self::new(pointer, RawPointerKind::Cancel, screen, timestamp_ms)
    }

    pub fn wheel(screen: Vec2, delta: MouseWheelDelta, timestamp_ms: f64) -> Self {
        Self::new(PointerId::MOUSE, RawPointerKind::Wheel(delta), screen, timestamp_ms)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The pressed or released button, if any.
    pub fn button(&self) -> Option<MouseButton> {
        match self.kind {
            RawPointerKind::Down(b) | RawPointerKind::Up(b) => Some(b),
            _ => None,
        }
    }
}
