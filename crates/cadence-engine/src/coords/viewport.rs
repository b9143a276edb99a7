use super::{Rect, Vec2};

/// Visible region of a surface, in screen pixels.
///
/// `offset` is where the surface's camera space starts inside the window; cameras subtract it
/// when going from screen to camera coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { offset: Vec2::ZERO, width, height }
    }

    #[inline]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// The viewport as a screen-space rect.
    #[inline]
    pub fn rect(self) -> Rect {
        Rect::from_corners(self.offset, self.offset + Vec2::new(self.width, self.height))
    }
}
