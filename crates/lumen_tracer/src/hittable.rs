//! Scene object capability trait.
//!
//! Every primitive answers a cheap hit test ([`Hittable::intersect`]) and,
//! only for the winning candidate, the more expensive surface query
//! ([`Hittable::surface`]). Emissive primitives are additionally sampled by
//! area for next-event estimation.

use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Result of a single-primitive hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance along the (unit direction) ray
    pub t: f32,
    /// Sub-primitive index, e.g. the triangle within a mesh. Zero for
    /// primitives that have no parts.
    pub sub_index: u32,
}

impl Hit {
    pub fn new(t: f32, sub_index: u32) -> Self {
        Self { t, sub_index }
    }
}

/// World-space position and outward geometric normal at a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub point: Vec3,
    pub normal: Vec3,
}

/// A point drawn uniformly on a primitive's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    /// Outward unit normal at `point`
    pub normal: Vec3,
    /// Density per unit area, `1 / area` for uniform sampling
    pub pdf: f32,
}

/// Trait for objects that can be placed in a scene.
pub trait Hittable: Send + Sync {
    /// Nearest hit strictly inside `ray_t`, if any.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit>;

    /// Position and outward normal for a hit returned by [`Hittable::intersect`].
    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Total surface area, used to weight light selection.
    fn area(&self) -> f32;

    /// Draw a point uniformly over the surface.
    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample;

    /// Material shared by the whole object.
    fn material(&self) -> &dyn Material;

    /// Whether this object is a light source.
    fn has_emit(&self) -> bool {
        self.material().has_emission()
    }
}
