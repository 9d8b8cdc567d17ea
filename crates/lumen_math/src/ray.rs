use crate::Vec3;

/// A ray with an origin and a unit-length direction.
///
/// The direction is normalized on construction, so distances returned by
/// intersection routines are true world-space distances and can be compared
/// across objects directly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` does not need to be normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Create a ray starting at `origin` and pointing at `target`.
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Component-wise reciprocal of the direction, used by slab tests.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at distance t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
