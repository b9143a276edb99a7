//! Cadence engine crate.
//!
//! A frame scheduler shared by every rendering surface on the thread, and a pointer/gesture
//! layer on top of it:
//! - [`scheduler`]: the `GlobalManager` singleton, six ordered stages per frame and the
//!   per-engine object registry
//! - [`surface`]: one [`Engine`](surface::Engine) per surface, with bounds, camera and controls
//! - [`input`]: per-object and per-engine input controls, drag and pinch gestures, and
//!   subscriptions
//! - [`window`]: the `winit` runtime that owns windows and drives frames

pub mod camera;
pub mod config;
pub mod coords;
pub mod core;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod id;
pub mod input;
pub mod logging;
pub mod scheduler;
pub mod surface;
pub mod time;
pub mod window;

/// Common imports for applications.
pub mod prelude {
    pub use crate::camera::{Camera, PanZoomCamera};
    pub use crate::config::{DragLimit, EngineConfig, SchedulerConfig};
    pub use crate::coords::{Rect, Vec2, Viewport};
    pub use crate::core::{App, AppControl, FrameCtx, SurfaceCtx};
    pub use crate::entity::{Entity, Schedulable, Transform};
    pub use crate::error::{EngineError, Result};
    pub use crate::handlers::Disposer;
    pub use crate::id::{EngineId, ListenerId, PointerId, SubscriberId};
    pub use crate::input::{InputControl, InputEvent, InputEventKind, Position};
    pub use crate::logging::{init_logging, LoggingConfig};
    pub use crate::scheduler::{global, GlobalManager, Stage};
    pub use crate::surface::Engine;
    pub use crate::time::FrameTime;
    pub use crate::window::{Runtime, RuntimeConfig, RuntimeCtx};
}
