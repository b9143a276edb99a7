use std::fmt;

use crate::coords::Vec2;
use crate::id::{ListenerId, PointerId};
use crate::surface::Engine;

use super::gesture::GestureKey;
use super::types::{Modifiers, MouseButton};

/// A point expressed in every space an engine knows about.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Position {
    pub screen: Vec2,
    pub camera: Vec2,
    pub world: Vec2,
    /// Relative to the receiving entity's transform; equals `world` for global listeners.
    pub local: Vec2,
}

impl Position {
    /// The same point in every space; used when no camera is available.
    pub fn identity(screen: Vec2) -> Self {
        Self {
            screen,
            camera: screen,
            world: screen,
            local: screen,
        }
    }

    /// Component-wise `self - origin` in every space.
    pub fn delta_from(&self, origin: &Position) -> Position {
        Position {
            screen: self.screen - origin.screen,
            camera: self.camera - origin.camera,
            world: self.world - origin.world,
            local: self.local - origin.local,
        }
    }
}

/// Canonical event names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InputEventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    DragStart,
    Drag,
    DragEnd,
    PinchStart,
    Pinch,
    PinchEnd,
}

impl InputEventKind {
    pub const ALL: [InputEventKind; 10] = [
        InputEventKind::PointerDown,
        InputEventKind::PointerMove,
        InputEventKind::PointerUp,
        InputEventKind::Wheel,
        InputEventKind::DragStart,
        InputEventKind::Drag,
        InputEventKind::DragEnd,
        InputEventKind::PinchStart,
        InputEventKind::Pinch,
        InputEventKind::PinchEnd,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            InputEventKind::PointerDown => "pointerDown",
            InputEventKind::PointerMove => "pointerMove",
            InputEventKind::PointerUp => "pointerUp",
            InputEventKind::Wheel => "wheel",
            InputEventKind::DragStart => "dragStart",
            InputEventKind::Drag => "drag",
            InputEventKind::DragEnd => "dragEnd",
            InputEventKind::PinchStart => "pinchStart",
            InputEventKind::Pinch => "pinch",
            InputEventKind::PinchEnd => "pinchEnd",
        }
    }

    pub const fn is_pinch(self) -> bool {
        matches!(
            self,
            InputEventKind::PinchStart | InputEventKind::Pinch | InputEventKind::PinchEnd
        )
    }
}

impl fmt::Display for InputEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerPayload {
    pub pointer: PointerId,
    pub position: Position,
    pub button: Option<MouseButton>,
    /// Listener that received the raw event.
    pub origin: ListenerId,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragStartPayload {
    pub pointer: PointerId,
    pub start: Position,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragPayload {
    pub pointer: PointerId,
    pub start: Position,
    pub position: Position,
    /// `position - start`, per space.
    pub delta: Position,
}

/// Why a drag ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReleaseReason {
    Up,
    Cancel,
    /// Forcibly released by the drag limit.
    Evicted,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragEndPayload {
    pub pointer: PointerId,
    pub start: Position,
    pub end: Position,
    pub reason: ReleaseReason,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WheelPayload {
    pub position: Position,
    /// Screen-space scroll amount in pixels.
    pub delta: Vec2,
    /// `delta` converted into world units by the engine's camera.
    pub world_delta: Vec2,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinchPayload {
    pub key: GestureKey,
    /// The two pointers, earlier press first.
    pub pair: [PointerId; 2],
    pub positions: [Position; 2],
    /// Current screen-space distance between the pair.
    pub distance: f32,
    /// Screen-space distance between the two press points.
    pub start_distance: f32,
}

impl PinchPayload {
    /// `distance / start_distance`, or 1 when the pair started on the same point.
    pub fn scale(&self) -> f32 {
        if self.start_distance > f32::EPSILON {
            self.distance / self.start_distance
        } else {
            1.0
        }
    }
}

/// Normalized pointer and gesture event delivered to input handlers and subscribers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerPayload),
    PointerMove(PointerPayload),
    PointerUp(PointerPayload),
    Wheel(WheelPayload),
    DragStart(DragStartPayload),
    Drag(DragPayload),
    DragEnd(DragEndPayload),
    PinchStart(PinchPayload),
    Pinch(PinchPayload),
    PinchEnd(PinchPayload),
}

impl InputEvent {
    pub fn kind(&self) -> InputEventKind {
        match self {
            InputEvent::PointerDown(_) => InputEventKind::PointerDown,
            InputEvent::PointerMove(_) => InputEventKind::PointerMove,
            InputEvent::PointerUp(_) => InputEventKind::PointerUp,
            InputEvent::Wheel(_) => InputEventKind::Wheel,
            InputEvent::DragStart(_) => InputEventKind::DragStart,
            InputEvent::Drag(_) => InputEventKind::Drag,
            InputEvent::DragEnd(_) => InputEventKind::DragEnd,
            InputEvent::PinchStart(_) => InputEventKind::PinchStart,
            InputEvent::Pinch(_) => InputEventKind::Pinch,
            InputEvent::PinchEnd(_) => InputEventKind::PinchEnd,
        }
    }

    /// The event with every position re-projected through `engine`'s camera. Screen
    /// coordinates are kept; `local` becomes the new world position.
    pub fn reprojected(&self, engine: &Engine) -> InputEvent {
        let p = |pos: &Position| engine.project(pos.screen);
        match self {
            InputEvent::PointerDown(e) => InputEvent::PointerDown(PointerPayload {
                position: p(&e.position),
                ..*e
            }),
            InputEvent::PointerMove(e) => InputEvent::PointerMove(PointerPayload {
                position: p(&e.position),
                ..*e
            }),
            InputEvent::PointerUp(e) => InputEvent::PointerUp(PointerPayload {
                position: p(&e.position),
                ..*e
            }),
            InputEvent::Wheel(e) => InputEvent::Wheel(WheelPayload {
                position: p(&e.position),
                world_delta: engine.world_delta_from_screen(e.delta),
                ..*e
            }),
            InputEvent::DragStart(e) => InputEvent::DragStart(DragStartPayload {
                start: p(&e.start),
                ..*e
            }),
            InputEvent::Drag(e) => {
                let start = p(&e.start);
                let position = p(&e.position);
                InputEvent::Drag(DragPayload {
                    start,
                    position,
                    delta: position.delta_from(&start),
                    ..*e
                })
            }
            InputEvent::DragEnd(e) => InputEvent::DragEnd(DragEndPayload {
                start: p(&e.start),
                end: p(&e.end),
                ..*e
            }),
            InputEvent::PinchStart(e) => InputEvent::PinchStart(reproject_pinch(e, engine)),
            InputEvent::Pinch(e) => InputEvent::Pinch(reproject_pinch(e, engine)),
            InputEvent::PinchEnd(e) => InputEvent::PinchEnd(reproject_pinch(e, engine)),
        }
    }
}

fn reproject_pinch(e: &PinchPayload, engine: &Engine) -> PinchPayload {
    PinchPayload {
        positions: [
            engine.project(e.positions[0].screen),
            engine.project(e.positions[1].screen),
        ],
        ..*e
    }
}
