//! Input subsystem.
//!
//! The event vocabulary is platform-agnostic; [`platform`] holds the winit translation.
//! Runtime code translates platform events into [`RawPointerEvent`]s and hands them to an
//! [`crate::surface::Engine`], whose [`InputControl`]s normalize them into pointer, drag and
//! pinch events. Pointer and gesture state lives in the engine's [`GlobalInputControl`].

mod control;
mod coordinator;
mod event;
mod gesture;
mod pointer;
mod state;
mod types;

pub mod platform;

pub use control::InputControl;
pub use coordinator::{GlobalInputControl, SubscriberFn};
pub use event::{
    DragEndPayload, DragPayload, DragStartPayload, InputEvent, InputEventKind, PinchPayload,
    PointerPayload, Position, ReleaseReason, WheelPayload,
};
pub use gesture::{
    DragGesture, Gesture, GestureKey, GestureKind, GestureState, GestureTable, PinchGesture,
    PinchSnapshot,
};
pub use pointer::{PointerRecord, PointerTable};
pub use state::{PlatformInput, PointerState};
pub use types::{Modifiers, MouseButton, MouseWheelDelta, RawPointerEvent, RawPointerKind};
