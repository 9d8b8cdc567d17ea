//! Random sampling helpers shared by materials, primitives and the camera.
//!
//! Everything takes the generator explicitly. There is no global RNG, so
//! each worker or sample path owns its own stream.

use lumen_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling keeps the distribution uniform
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// Offsetting a uniform sphere sample by the normal gives a density of
/// `cos(theta) / pi`, see [`cosine_hemisphere_pdf`].
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let direction = normal + random_unit_vector(rng);

    // Catch degenerate scatter direction
    if direction.length_squared() < 1e-8 {
        normal
    } else {
        direction.normalize()
    }
}

/// Density of [`cosine_hemisphere`] for `direction`, zero below the surface.
#[inline]
pub fn cosine_hemisphere_pdf(direction: Vec3, normal: Vec3) -> f32 {
    direction.dot(normal).max(0.0) / PI
}

/// Uniform point on the unit sphere from two uniform numbers.
pub fn uniform_sphere(u: f32, v: f32) -> Vec3 {
    let z = 1.0 - 2.0 * u;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * v;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform barycentric coordinates `(b1, b2)` over a triangle.
///
/// The point is `v0 + b1 * (v1 - v0) + b2 * (v2 - v0)`.
pub fn uniform_triangle(u: f32, v: f32) -> (f32, f32) {
    let su = u.sqrt();
    (su * (1.0 - v), su * v)
}
