//! Coordinate and geometry types shared by the scheduler, cameras and input.
//!
//! Three spaces are in play:
//! - **screen**: logical pixels relative to the window, origin top-left, +Y down
//! - **camera**: screen space shifted into the surface viewport
//! - **world**: scene space after the camera's pan/zoom is undone
//!
//! Conversions between them are owned by [`crate::camera::Camera`]; these types carry no
//! transform logic of their own.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
