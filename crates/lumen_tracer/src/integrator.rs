//! Path tracing integrator: next-event estimation plus BRDF-sampled
//! indirect bounces, terminated by Russian roulette.
//!
//! The estimator is defined recursively. At a non-emissive hit the radiance
//! is the direct term from one light sample, plus, if the path survives the
//! roulette draw, the BRDF-sampled indirect term divided by the survival
//! probability. An emitter reached by a bounce contributes nothing because
//! the light sample at the previous vertex already counted it.
//!
//! [`PathIntegrator::trace_path`] evaluates that recursion as a loop with a
//! running throughput weight, so a long unlucky path never grows the stack.

use crate::error::ConfigError;
use crate::intersection::Intersection;
use crate::light::LightPdf;
use crate::sampling::gen_f32;
use crate::{Color, Scene};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Integrator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Probability that a path continues after each bounce, in `[0, 1)`.
    /// Zero disables indirect light.
    pub russian_roulette: f32,
    /// Optional hard cap on bounces on top of Russian roulette
    pub max_depth: Option<u32>,
    /// How close the shadow ray's hit must land to the light sample to
    /// count as unoccluded
    pub visibility_tolerance: f32,
    /// Hits closer than this to a ray's origin are ignored
    pub ray_epsilon: f32,
    /// Light sample density normalization
    pub light_pdf: LightPdf,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            russian_roulette: 0.8,
            max_depth: None,
            visibility_tolerance: 1e-2,
            ray_epsilon: 1e-3,
            light_pdf: LightPdf::PerObject,
        }
    }
}

impl IntegratorConfig {
    /// Check the parameters describe an estimator that terminates and never
    /// divides by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.russian_roulette;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::SurvivalProbability(p));
        }
        if p == 1.0 && self.max_depth.is_none() {
            return Err(ConfigError::UnboundedDepth);
        }
        for (name, value) in [
            ("visibility_tolerance", self.visibility_tolerance),
            ("ray_epsilon", self.ray_epsilon),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Radiance carried by one path plus how many indirect bounces it took.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathResult {
    pub radiance: Color,
    pub bounces: u32,
}

/// Monte Carlo path tracer.
///
/// Holds only configuration; all mutable state is the caller's RNG, so one
/// integrator can serve any number of threads.
#[derive(Debug, Clone)]
pub struct PathIntegrator {
    config: IntegratorConfig,
}

impl PathIntegrator {
    pub fn new(config: IntegratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Radiance arriving at the origin of `ray` from along its direction.
    ///
    /// `depth` is the bounce count of `ray` itself; pass 0 for camera rays.
    pub fn estimate(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.trace_path(scene, ray, depth, rng).radiance
    }

    /// Same as [`PathIntegrator::estimate`], also reporting path length.
    pub fn trace_path(
        &self,
        scene: &Scene,
        ray: &Ray,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> PathResult {
        let range = Interval::from_min(self.config.ray_epsilon);

        let Some(mut hit) = scene.intersect(ray, range) else {
            return PathResult::default();
        };

        if hit.is_emissive() {
            // Seen directly only by camera rays; a bounce that lands here was
            // already counted by the light sample one vertex earlier
            let radiance = if depth == 0 { hit.emit() } else { Color::ZERO };
            return PathResult {
                radiance,
                bounces: 0,
            };
        }

        let mut incoming = ray.direction();
        let mut depth = depth;
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut bounces = 0;

        loop {
            radiance += throughput * self.direct_lighting(scene, incoming, &hit, rng);

            if self.config.max_depth.is_some_and(|max| depth >= max) {
                break;
            }
            if !self.survives(rng) {
                break;
            }

            let normal = hit.normal;
            let outgoing = hit.material.sample(incoming, normal, rng).normalize_or_zero();
            if outgoing == Vec3::ZERO {
                break;
            }

            let next_ray = Ray::new(hit.coords, outgoing);
            let Some(next) = scene.intersect(&next_ray, range) else {
                break;
            };
            if next.is_emissive() {
                break;
            }

            let pdf = hit.material.pdf(incoming, outgoing, normal);
            if !(pdf > f32::EPSILON) {
                break;
            }
            let cos_theta = outgoing.dot(normal).max(0.0);
            let weight = hit.material.eval(incoming, outgoing, normal) * cos_theta
                / pdf
                / self.config.russian_roulette;
            if !weight.is_finite() {
                break;
            }

            throughput *= weight;
            incoming = outgoing;
            hit = next;
            depth += 1;
            bounces += 1;
        }

        log::trace!("path: {bounces} bounces, radiance {radiance:?}");
        PathResult { radiance, bounces }
    }

    /// Roulette draw: true if the path continues.
    fn survives(&self, rng: &mut dyn RngCore) -> bool {
        let p = self.config.russian_roulette;
        p > 0.0 && gen_f32(rng) < p
    }

    /// One-sample estimate of light arriving straight from an emitter.
    fn direct_lighting(
        &self,
        scene: &Scene,
        incoming: Vec3,
        hit: &Intersection<'_>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(light) = scene.sample_light(rng, self.config.light_pdf) else {
            return Color::ZERO;
        };

        let to_light = light.coords - hit.coords;
        let distance_sq = to_light.length_squared();
        if !(distance_sq > f32::EPSILON) {
            return Color::ZERO;
        }
        let direction = to_light / distance_sq.sqrt();

        // Back-facing on either end carries no energy
        let cos_surface = direction.dot(hit.normal);
        let cos_light = (-direction).dot(light.normal);
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return Color::ZERO;
        }

        let shadow_ray = Ray::new(hit.coords, direction);
        let range = Interval::from_min(self.config.ray_epsilon);
        let visible = scene
            .intersect(&shadow_ray, range)
            .is_some_and(|blocker| {
                (blocker.coords - light.coords).length() < self.config.visibility_tolerance
            });
        if !visible {
            return Color::ZERO;
        }

        let brdf = hit.material.eval(incoming, direction, hit.normal);
        let contribution = light.emit * brdf * cos_surface * cos_light / distance_sq / light.pdf;
        if contribution.is_finite() {
            contribution
        } else {
            Color::ZERO
        }
    }
}
