//! Indexed triangle mesh treated as a single scene object.
//!
//! A mesh is one entry in the scene's object list; the triangle that was hit
//! is reported through [`Hit::sub_index`]. Light sampling picks a triangle
//! proportionally to its area, so the density is uniform over the mesh.

use crate::error::{SceneError, SceneResult};
use crate::hittable::{Hit, Hittable, SurfacePoint, SurfaceSample};
use crate::sampling::{gen_f32, uniform_triangle};
use crate::triangle::intersect_triangle;
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Triangle mesh with a shared material.
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    /// Per-triangle outward normals
    normals: Vec<Vec3>,
    /// Running sum of triangle areas, for area-weighted sampling
    cumulative_area: Vec<f32>,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl TriangleMesh {
    pub fn new(
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
        material: Arc<dyn Material>,
    ) -> SceneResult<Self> {
        if triangles.is_empty() {
            return Err(SceneError::EmptyMesh);
        }
        if let Some(&index) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertices.len())
        {
            return Err(SceneError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        let mut normals = Vec::with_capacity(triangles.len());
        let mut cumulative_area = Vec::with_capacity(triangles.len());
        let mut total = 0.0;
        for tri in &triangles {
            let [v0, v1, v2] = tri.map(|i| vertices[i as usize]);
            let cross = (v1 - v0).cross(v2 - v0);
            total += 0.5 * cross.length();
            normals.push(cross.normalize_or_zero());
            cumulative_area.push(total);
        }
        if !(total > 0.0) {
            return Err(SceneError::ZeroArea("mesh"));
        }

        let bbox = Aabb::enclosing(triangles.iter().flatten().map(|&i| vertices[i as usize]));
        log::debug!(
            "Mesh: {} triangles, {} vertices, area {:.4}",
            triangles.len(),
            vertices.len(),
            total
        );

        Ok(Self {
            vertices,
            triangles,
            normals,
            cumulative_area,
            material,
            bbox,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corners(&self, index: usize) -> [Vec3; 3] {
        self.triangles[index].map(|i| self.vertices[i as usize])
    }
}

impl Hittable for TriangleMesh {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let mut closest: Option<Hit> = None;

        for index in 0..self.triangles.len() {
            let [v0, v1, v2] = self.corners(index);
            let Some(t) = intersect_triangle(ray, v0, v1, v2, ray_t) else {
                continue;
            };
            if closest.map_or(true, |best| t < best.t) {
                closest = Some(Hit::new(t, index as u32));
            }
        }

        closest
    }

    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint {
        SurfacePoint {
            point: ray.at(hit.t),
            normal: self.normals[hit.sub_index as usize],
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.cumulative_area.last().copied().unwrap_or(0.0)
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let total = self.area();
        let target = gen_f32(rng) * total;
        let index = self
            .cumulative_area
            .partition_point(|&acc| acc <= target)
            .min(self.triangles.len() - 1);

        let [v0, v1, v2] = self.corners(index);
        let (b1, b2) = uniform_triangle(gen_f32(rng), gen_f32(rng));
        SurfaceSample {
            point: v0 + b1 * (v1 - v0) + b2 * (v2 - v0),
            normal: self.normals[index],
            pdf: 1.0 / total,
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
