//! Sphere primitive for ray tracing.

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Hit, Hittable, SurfacePoint, SurfaceSample};
use crate::sampling::{gen_f32, uniform_sphere};
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. The radius must be positive.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> SceneResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::InvalidRadius(radius));
        }
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Ok(Self {
            center,
            radius,
            material,
            bbox,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        // Unit direction, so the quadratic's `a` term is 1
        let oc = self.center - ray.origin();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = h - sqrtd;
        if !ray_t.surrounds(root) {
            root = h + sqrtd;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        Some(Hit::new(root, 0))
    }

    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint {
        let point = ray.at(hit.t);
        SurfacePoint {
            point,
            normal: (point - self.center) / self.radius,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = uniform_sphere(gen_f32(rng), gen_f32(rng));
        SurfaceSample {
            point: self.center + self.radius * normal,
            normal,
            pdf: 1.0 / self.area(),
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 0.5).abs() < 0.001);

        let surface = sphere.surface(&ray, &hit);
        assert!((surface.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()).unwrap();

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey()).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(sphere.center(), Vec3::ZERO);
        assert_eq!(sphere.radius(), 2.0);

        let hit = sphere.intersect(&ray, Interval::from_min(0.001)).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert_eq!(
            Sphere::new(Vec3::ZERO, 0.0, grey()).err(),
            Some(SceneError::InvalidRadius(0.0))
        );
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, grey()).is_err());
    }

    #[test]
    fn test_sphere_sample_on_surface() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 1.5, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            let s = sphere.sample(&mut rng);
            assert!(((s.point - sphere.center()).length() - 1.5).abs() < 1e-4);
            assert!((s.normal.length() - 1.0).abs() < 1e-4);
            assert!((s.pdf * sphere.area() - 1.0).abs() < 1e-5);
        }
    }
}
