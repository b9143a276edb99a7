//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and one engine per window, feeds pointer input into each engine
//! and paces the shared scheduler.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use winit::window::CursorIcon;
