//! Material capability trait and the diffuse models used by the scenes.
//!
//! The integrator only ever asks a material four questions: does it emit,
//! what is the BRDF for a direction pair, draw an outgoing direction, and
//! what density that draw had. Directions follow one convention throughout:
//! `incoming` points *towards* the surface (it is the direction of the ray
//! that arrived), `outgoing` points away from it.

use crate::sampling::{cosine_hemisphere, cosine_hemisphere_pdf};
use lumen_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (linear RGB radiance, unbounded above)
pub type Color = Vec3;

/// Emission below this magnitude counts as "not a light".
const EMISSION_EPSILON: f32 = 1e-5;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Radiance emitted by the surface. Most materials return black.
    fn emission(&self) -> Color {
        Color::ZERO
    }

    /// Whether the surface is a light source.
    fn has_emission(&self) -> bool {
        self.emission().length() > EMISSION_EPSILON
    }

    /// BRDF value for light arriving along `incoming` and leaving along `outgoing`.
    fn eval(&self, incoming: Vec3, outgoing: Vec3, normal: Vec3) -> Color;

    /// Draw an outgoing direction from the BRDF's importance distribution.
    fn sample(&self, incoming: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Density of [`Material::sample`] at `outgoing`, per unit solid angle.
    fn pdf(&self, incoming: Vec3, outgoing: Vec3, normal: Vec3) -> f32;
}

/// Lambertian (diffuse) material, optionally emissive.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
    emission: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo,
            emission: Color::ZERO,
        }
    }

    /// A diffuse surface that also emits `emission`. Area lights in the
    /// Cornell box are built this way.
    pub fn with_emission(albedo: Color, emission: Color) -> Self {
        Self { albedo, emission }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Material for Lambertian {
    fn emission(&self) -> Color {
        self.emission
    }

    fn eval(&self, _incoming: Vec3, outgoing: Vec3, normal: Vec3) -> Color {
        if outgoing.dot(normal) > 0.0 {
            self.albedo / PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _incoming: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        cosine_hemisphere(normal, rng)
    }

    fn pdf(&self, _incoming: Vec3, outgoing: Vec3, normal: Vec3) -> f32 {
        cosine_hemisphere_pdf(outgoing, normal)
    }
}

/// Diffuse light emitter. Lights don't reflect.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn emission(&self) -> Color {
        self.emit
    }

    fn eval(&self, _incoming: Vec3, _outgoing: Vec3, _normal: Vec3) -> Color {
        Color::ZERO
    }

    fn sample(&self, _incoming: Vec3, normal: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        normal
    }

    fn pdf(&self, _incoming: Vec3, _outgoing: Vec3, _normal: Vec3) -> f32 {
        0.0
    }
}
