//! Time subsystem.
//!
//! One `FrameClock` is owned by the scheduler; each tick produces the `FrameTime` passed to
//! every engine hook in that frame.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
