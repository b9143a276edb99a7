//! Camera collaborator.
//!
//! The scheduler and input layer never do coordinate math themselves: every screen → camera →
//! world conversion goes through a [`Camera`] owned by the engine. Cameras are read-only from
//! this crate's point of view.

use std::cell::Cell;

use crate::coords::{Vec2, Viewport};

/// Coordinate-transform provider for one surface.
pub trait Camera {
    /// Screen pixels → camera space.
    fn camera_from_screen(&self, screen: Vec2) -> Vec2;

    /// Camera space → world space.
    fn world_from_camera(&self, camera: Vec2) -> Vec2;

    /// Converts a world-space displacement into camera space.
    fn camera_delta_from_world_delta(&self, delta: Vec2) -> Vec2;

    /// Converts a camera-space displacement into world space.
    fn world_delta_from_camera_delta(&self, delta: Vec2) -> Vec2;

    /// Current viewport size and offset.
    fn viewport(&self) -> Viewport;
}

/// Camera with no transform. Used when an engine has no camera attached yet.
#[derive(Debug, Copy, Clone, Default)]
pub struct IdentityCamera;

impl Camera for IdentityCamera {
    fn camera_from_screen(&self, screen: Vec2) -> Vec2 {
        screen
    }

    fn world_from_camera(&self, camera: Vec2) -> Vec2 {
        camera
    }

    fn camera_delta_from_world_delta(&self, delta: Vec2) -> Vec2 {
        delta
    }

    fn world_delta_from_camera_delta(&self, delta: Vec2) -> Vec2 {
        delta
    }

    fn viewport(&self) -> Viewport {
        Viewport::default()
    }
}

/// Pan/zoom camera: `world = camera / zoom + pan`, `camera = screen - viewport.offset`.
///
/// Interior mutability lets the owner pan or zoom while the engine holds a shared handle.
#[derive(Debug)]
pub struct PanZoomCamera {
    viewport: Cell<Viewport>,
    pan: Cell<Vec2>,
    zoom: Cell<f32>,
}

impl PanZoomCamera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Cell::new(viewport),
            pan: Cell::new(Vec2::ZERO),
            zoom: Cell::new(1.0),
        }
    }

    pub fn pan(&self) -> Vec2 {
        self.pan.get()
    }

    pub fn set_pan(&self, pan: Vec2) {
        self.pan.set(pan);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom.get()
    }

    /// Sets the zoom factor, clamped to `[0.05, 32.0]`.
    pub fn set_zoom(&self, zoom: f32) {
        self.zoom.set(zoom.clamp(0.05, 32.0));
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }
}

impl Camera for PanZoomCamera {
    fn camera_from_screen(&self, screen: Vec2) -> Vec2 {
        screen - self.viewport.get().offset
    }

    fn world_from_camera(&self, camera: Vec2) -> Vec2 {
        camera / self.zoom.get() + self.pan.get()
    }

    fn camera_delta_from_world_delta(&self, delta: Vec2) -> Vec2 {
        delta * self.zoom.get()
    }

    fn world_delta_from_camera_delta(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom.get()
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }
}
