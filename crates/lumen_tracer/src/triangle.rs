//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Hit, Hittable, SurfacePoint, SurfaceSample};
use crate::sampling::{gen_f32, uniform_triangle};
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Möller-Trumbore test against the triangle `(v0, v1, v2)`.
///
/// Returns the distance along the ray when it lies inside `ray_t`.
pub(crate) fn intersect_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    ray_t: Interval,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction().cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin() - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction().dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    ray_t.surrounds(t).then_some(t)
}

/// A triangle primitive.
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The outward normal follows the winding: `(v1 - v0) × (v2 - v0)`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> SceneResult<Self> {
        let cross = (v1 - v0).cross(v2 - v0);
        let area = 0.5 * cross.length();
        if !(area > 0.0) {
            return Err(SceneError::ZeroArea("triangle"));
        }

        Ok(Self {
            v0,
            v1,
            v2,
            normal: cross.normalize(),
            area,
            material,
            bbox: Aabb::enclosing([v0, v1, v2]),
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        intersect_triangle(ray, self.v0, self.v1, self.v2, ray_t).map(|t| Hit::new(t, 0))
    }

    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint {
        SurfacePoint {
            point: ray.at(hit.t),
            normal: self.normal,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let (b1, b2) = uniform_triangle(gen_f32(rng), gen_f32(rng));
        SurfaceSample {
            point: self.v0 + b1 * (self.v1 - self.v0) + b2 * (self.v2 - self.v0),
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
