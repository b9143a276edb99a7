//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform loop)
//! and higher layers (studio, tools). It avoids leaking runtime internals
//! into user code and provides consistent per-surface and per-frame contexts.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SurfaceCtx, WindowCtx};
pub(crate) use ctx::logical_size;
