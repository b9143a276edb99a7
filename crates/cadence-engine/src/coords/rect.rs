use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
///
/// Used for surface bounds (screen space) and local hit areas (world space). No other hit
/// shapes exist in the input layer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Builds a rect from two opposite corners in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vec2::new(a.x.max(b.x), a.y.max(b.y));
        Self { origin: min, size: max - min }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Flips negative extents so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        Rect::from_corners(self.min(), self.max())
    }

    /// Half-open containment: `[min, max)`.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        let max = r.max();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < max.x && p.y < max.y
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Self {
        Self { origin: self.origin + by, size: self.size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn surface_bounds_accept_interior_press() {
        assert!(r(0.0, 0.0, 200.0, 200.0).contains(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn contains_handles_negative_extent() {
        let flipped = r(10.0, 10.0, -10.0, -10.0);
        assert!(flipped.contains(Vec2::new(5.0, 5.0)));
        assert!(!flipped.contains(Vec2::new(15.0, 5.0)));
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn from_corners_orders_points() {
        let rect = Rect::from_corners(Vec2::new(8.0, 2.0), Vec2::new(1.0, 6.0));
        assert_eq!(rect, r(1.0, 2.0, 7.0, 4.0));
    }

    #[test]
    fn translated_keeps_size() {
        let rect = r(1.0, 1.0, 3.0, 3.0).translated(Vec2::new(2.0, -1.0));
        assert_eq!(rect, r(3.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
