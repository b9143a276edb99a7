//! Rendering surfaces.
//!
//! An [`Engine`] is one independent surface (a window, a canvas, an offscreen view) with its own
//! bounds, camera and input controls. Every engine shares the thread's scheduler, frame clock
//! and id space.

mod engine;

pub use engine::{Engine, StageEvent};
