//! Area-weighted sampling over the union of emissive surfaces.

use crate::hittable::Hittable;
use crate::intersection::ObjectId;
use crate::sampling::gen_f32;
use crate::Color;
use lumen_math::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How the light sample's density is normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightPdf {
    /// Report the chosen object's own density, `1 / object area`.
    ///
    /// Exact for a single light. With several lights of different sizes the
    /// selection probability is not folded in and the direct term is biased
    /// towards the larger lights' share.
    #[default]
    PerObject,
    /// Fold in the area-proportional selection probability, giving
    /// `1 / total emissive area` for every sample.
    Mixture,
}

/// A point on a light source, ready for next-event estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub coords: Vec3,
    /// Outward normal of the emitter at `coords`
    pub normal: Vec3,
    /// Emitted radiance at `coords`
    pub emit: Color,
    /// Density per unit area, strictly positive
    pub pdf: f32,
    pub object_id: ObjectId,
}

#[derive(Debug, Clone, Copy)]
struct Emitter {
    id: ObjectId,
    area: f32,
}

/// Picks emissive objects proportionally to their surface area.
///
/// Holds object handles only; the geometry stays in the scene.
#[derive(Debug, Clone, Default)]
pub struct LightSampler {
    emitters: Vec<Emitter>,
    total_area: f32,
}

impl LightSampler {
    /// Collect every emissive object with a positive area.
    pub fn new(objects: &[Box<dyn Hittable>]) -> Self {
        let emitters: Vec<Emitter> = objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.has_emit())
            .map(|(index, object)| Emitter {
                id: ObjectId(index),
                area: object.area(),
            })
            .filter(|e| e.area > 0.0 && e.area.is_finite())
            .collect();
        let total_area = emitters.iter().map(|e| e.area).sum();

        Self {
            emitters,
            total_area,
        }
    }

    /// Sum of the areas of all emissive objects.
    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Draw a point on an emitter chosen with probability `area / total area`.
    ///
    /// Returns `None` when the scene has no emissive surface or the density
    /// would not be a usable positive number; callers treat that as "no
    /// direct light" rather than dividing by it.
    pub fn sample(
        &self,
        objects: &[Box<dyn Hittable>],
        rng: &mut dyn RngCore,
        mode: LightPdf,
    ) -> Option<LightSample> {
        let last = self.emitters.last()?;
        if !(self.total_area > 0.0) {
            return None;
        }

        let target = gen_f32(rng) * self.total_area;
        let mut running = 0.0;
        let emitter = self
            .emitters
            .iter()
            .find(|e| {
                running += e.area;
                target <= running
            })
            // Rounding can leave the running sum a hair short of the draw
            .unwrap_or(last);

        let object = &objects[emitter.id.0];
        let surface = object.sample(rng);
        let pdf = match mode {
            LightPdf::PerObject => surface.pdf,
            LightPdf::Mixture => surface.pdf * emitter.area / self.total_area,
        };
        if !(pdf > 0.0 && pdf.is_finite()) {
            return None;
        }

        Some(LightSample {
            coords: surface.point,
            normal: surface.normal,
            emit: object.material().emission(),
            pdf,
            object_id: emitter.id,
        })
    }
}
