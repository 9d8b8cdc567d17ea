//! Scene ownership and the two nearest-hit queries.
//!
//! [`SceneBuilder`] collects objects; [`SceneBuilder::build`] constructs the
//! spatial index and light sampler once and hands back an immutable
//! [`Scene`]. Nothing mutates a scene after that, so it can be shared
//! freely between threads while rendering.

use crate::bvh::BvhNode;
use crate::hittable::{Hit, Hittable};
use crate::intersection::{Intersection, ObjectId};
use crate::light::{LightPdf, LightSample, LightSampler};
use lumen_math::{Interval, Ray};
use rand::RngCore;
use std::time::Instant;

/// Collects scene objects before the index is built.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Box<dyn Hittable>>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, returning its handle in the finished scene.
    pub fn add(&mut self, object: impl Hittable + 'static) -> ObjectId {
        self.add_boxed(Box::new(object))
    }

    pub fn add_boxed(&mut self, object: Box<dyn Hittable>) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Get the number of objects added so far.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Build the spatial index and light sampler over every object.
    pub fn build(self) -> Scene {
        let start = Instant::now();
        let bvh = BvhNode::new(&self.objects);
        let lights = LightSampler::new(&self.objects);

        log::info!(
            "Scene built: {} objects, {} emitters (area {:.4}), BVH depth {} in {:?}",
            self.objects.len(),
            lights.emitter_count(),
            lights.total_area(),
            bvh.depth(),
            start.elapsed()
        );
        if lights.is_empty() {
            log::warn!("Scene has no emissive surfaces; direct lighting will be zero");
        }

        Scene {
            objects: self.objects,
            bvh,
            lights,
        }
    }
}

/// An immutable scene: the object arena, its BVH and its light sampler.
pub struct Scene {
    objects: Vec<Box<dyn Hittable>>,
    bvh: BvhNode,
    lights: LightSampler,
}

impl Scene {
    pub fn objects(&self) -> &[Box<dyn Hittable>] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> &dyn Hittable {
        self.objects[id.0].as_ref()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total area of all emissive surfaces.
    pub fn emissive_area(&self) -> f32 {
        self.lights.total_area()
    }

    pub fn bvh(&self) -> &BvhNode {
        &self.bvh
    }

    /// Nearest hit through the BVH.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        self.bvh
            .hit(&self.objects, ray, ray_t)
            .map(|(index, hit)| self.resolve(ray, index, hit))
    }

    /// Nearest hit by testing every object in order.
    ///
    /// Ties at equal distance go to the object added first. Produces the
    /// same answer as [`Scene::intersect`] and exists to cross-check it.
    pub fn trace(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        let mut closest: Option<(usize, Hit)> = None;

        for (index, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.intersect(ray, ray_t) {
                if closest.map_or(true, |(_, best)| hit.t < best.t) {
                    closest = Some((index, hit));
                }
            }
        }

        closest.map(|(index, hit)| self.resolve(ray, index, hit))
    }

    /// Draw a point on the emissive surfaces, see [`LightSampler::sample`].
    pub fn sample_light(&self, rng: &mut dyn RngCore, mode: LightPdf) -> Option<LightSample> {
        self.lights.sample(&self.objects, rng, mode)
    }

    fn resolve(&self, ray: &Ray, index: usize, hit: Hit) -> Intersection<'_> {
        Intersection::new(ray, hit, ObjectId(index), self.objects[index].as_ref())
    }
}
