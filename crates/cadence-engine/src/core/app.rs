use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::{FrameCtx, SurfaceCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once per window, after its engine is registered with the scheduler.
    fn on_surface_created(&mut self, ctx: &mut SurfaceCtx<'_>) -> AppControl;

    /// Called for window events, after pointer input was dispatched to the window's engine.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called after every scheduler frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }
}
