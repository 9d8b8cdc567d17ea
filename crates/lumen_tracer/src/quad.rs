//! Parallelogram primitive, the usual shape for area lights and box walls.

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Hit, Hittable, SurfacePoint, SurfaceSample};
use crate::sampling::gen_f32;
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// The parallelogram `corner + a * u + b * v` for `a, b` in `[0, 1]`.
///
/// Its outward normal is `normalize(u × v)`. For an emissive quad this is
/// the side that radiates; light sampling reports it as the light normal.
pub struct Quad {
    corner: Vec3,
    u: Vec3,
    v: Vec3,
    normal: Vec3,
    /// `n / (n · n)` with `n = u × v`, maps a planar offset to (a, b)
    w: Vec3,
    /// Plane offset: `normal · p == d` for points on the quad
    d: f32,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(corner: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> SceneResult<Self> {
        let n = u.cross(v);
        let area = n.length();
        if !(area > 0.0) {
            return Err(SceneError::ZeroArea("quad"));
        }
        let normal = n / area;

        Ok(Self {
            corner,
            u,
            v,
            normal,
            w: n / n.dot(n),
            d: normal.dot(corner),
            area,
            material,
            bbox: Aabb::enclosing([corner, corner + u, corner + v, corner + u + v]),
        })
    }

    /// Center of the parallelogram.
    pub fn center(&self) -> Vec3 {
        self.corner + 0.5 * (self.u + self.v)
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Quad {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let denom = self.normal.dot(ray.direction());

        // Ray is parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let planar = ray.at(t) - self.corner;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }

        Some(Hit::new(t, 0))
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
        let a = gen_f32(rng);
        let b = gen_f32(rng);
        SurfaceSample {
            point: self.corner + a * self.u + b * self.v,
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
