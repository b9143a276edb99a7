use std::rc::Rc;

use winit::window::{CursorIcon, Window, WindowId};

use crate::coords::Rect;
use crate::surface::Engine;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        logical_size(self.window)
    }

    /// The window's client area as engine bounds.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.logical_size();
        Rect::new(0.0, 0.0, w, h)
    }

    /// Sets the mouse cursor shape for this window.
    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }
}

pub(crate) fn logical_size(window: &Window) -> (f32, f32) {
    let phys  = window.inner_size();
    let scale = window.scale_factor();
    let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
    (logi.width as f32, logi.height as f32)
}

/// Context passed to `core::App::on_surface_created`.
pub struct SurfaceCtx<'a> {
    pub window:  WindowCtx<'a>,
    pub engine:  &'a Rc<Engine>,
    pub runtime: &'a mut RuntimeCtx,
}

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub time:       FrameTime,
    /// Frames completed by the scheduler, this one included.
    pub frames_run: u64,
    pub runtime:    &'a mut RuntimeCtx,
}
