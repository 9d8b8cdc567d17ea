//! The record produced by a scene-wide nearest-hit query.

use crate::{Color, Hit, Hittable, Material};
use lumen_math::{Ray, Vec3};
use std::fmt;

/// Stable handle to an object owned by a [`crate::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

/// Record of the nearest ray-scene intersection.
///
/// "No hit" is expressed as `None` by the queries that return this type,
/// so a value always describes a real surface. It borrows the object and
/// material from the scene and lives no longer than one estimator step.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// World-space hit point
    pub coords: Vec3,
    /// Unit surface normal, always pointing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the side the outward normal points to
    pub front_face: bool,
    /// Distance along the ray to the hit
    pub distance: f32,
    /// Which scene object was hit
    pub object_id: ObjectId,
    /// Part of the object that was hit (triangle index for meshes)
    pub sub_index: u32,
    pub object: &'a dyn Hittable,
    pub material: &'a dyn Material,
}

impl<'a> Intersection<'a> {
    /// Resolve a primitive hit into a full record.
    pub fn new(ray: &Ray, hit: Hit, object_id: ObjectId, object: &'a dyn Hittable) -> Self {
        let surface = object.surface(ray, &hit);
        let front_face = ray.direction().dot(surface.normal) < 0.0;
        let normal = if front_face {
            surface.normal
        } else {
            -surface.normal
        };

        Self {
            coords: surface.point,
            normal,
            front_face,
            distance: hit.t,
            object_id,
            sub_index: hit.sub_index,
            object,
            material: object.material(),
        }
    }

    /// Emission of the surface that was hit.
    pub fn emit(&self) -> Color {
        self.material.emission()
    }

    /// Whether the hit surface is a light source.
    pub fn is_emissive(&self) -> bool {
        self.material.has_emission()
    }
}

impl fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("coords", &self.coords)
            .field("normal", &self.normal)
            .field("front_face", &self.front_face)
            .field("distance", &self.distance)
            .field("object_id", &self.object_id)
            .field("sub_index", &self.sub_index)
            .finish_non_exhaustive()
    }
}
