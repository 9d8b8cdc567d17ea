//! Error types for scene and integrator construction.
//!
//! Only construction can fail. Once a scene is built, numerical trouble on a
//! single path (a zero density, a grazing light sample) is handled locally
//! by the integrator and never surfaces here.

use thiserror::Error;

/// Invalid integrator parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Russian roulette survival probability must lie in [0, 1], and 1 requires max_depth; got {0}")]
    SurvivalProbability(f32),

    #[error("Survival probability of 1 never terminates a path; set max_depth")]
    UnboundedDepth,

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

/// Degenerate geometry rejected while building a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Sphere radius must be positive, got {0}")]
    InvalidRadius(f32),

    #[error("Degenerate {0}: zero surface area")]
    ZeroArea(&'static str),

    #[error("Mesh has no triangles")]
    EmptyMesh,

    #[error("Mesh index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

pub type SceneResult<T> = Result<T, SceneError>;
