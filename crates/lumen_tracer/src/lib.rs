//! Lumen - CPU Monte Carlo path tracer.
//!
//! Unbiased estimation of the rendering equation for scenes made of diffuse
//! surfaces and area lights. Every shading point gathers one explicit light
//! sample (next-event estimation) and continues with a BRDF-sampled bounce
//! until Russian roulette ends the path.
//!
//! Scenes are assembled with a [`SceneBuilder`] and frozen into a [`Scene`],
//! which answers nearest-hit queries either by brute force or through a BVH
//! and draws light samples proportional to emitter area.

mod bvh;
mod camera;
mod error;
mod hittable;
mod integrator;
mod intersection;
mod light;
mod material;
mod mesh;
mod quad;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod triangle;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{ConfigError, SceneError, SceneResult};
pub use hittable::{Hit, Hittable, SurfacePoint, SurfaceSample};
pub use integrator::{IntegratorConfig, PathIntegrator, PathResult};
pub use intersection::{Intersection, ObjectId};
pub use light::{LightPdf, LightSample, LightSampler};
pub use material::{Color, DiffuseLight, Lambertian, Material};
pub use mesh::TriangleMesh;
pub use quad::Quad;
pub use renderer::{color_to_rgba, linear_to_gamma, render, render_pixel, ImageBuffer, RenderConfig};
pub use sampling::{cosine_hemisphere, cosine_hemisphere_pdf, gen_f32, random_unit_vector};
pub use scene::{Scene, SceneBuilder};
pub use sphere::Sphere;
pub use triangle::Triangle;

// Re-export math types for convenience
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
