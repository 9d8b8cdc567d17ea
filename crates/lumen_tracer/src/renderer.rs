//! Image rendering on top of the path integrator.
//!
//! Each pixel owns an RNG seeded from the render seed and its pixel index,
//! so a pixel's value does not depend on the order pixels are visited in.

use crate::{Camera, Color, PathIntegrator, Scene};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Base seed for the per-pixel generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            seed: 0,
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Average of `samples_per_pixel` path estimates through pixel (x, y).
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    integrator: &PathIntegrator,
    x: u32,
    y: u32,
    samples_per_pixel: u32,
    rng: &mut dyn RngCore,
) -> Color {
    if samples_per_pixel == 0 {
        return Color::ZERO;
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += integrator.estimate(scene, &ray, 0, rng);
    }

    pixel_color / samples_per_pixel as f32
}

/// Linear-radiance image, row-major from the top-left corner.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Mean radiance over the whole image.
    pub fn average(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }

    /// Convert to gamma-corrected RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color_to_rgba(*color))
            .collect()
    }
}

/// Render the entire scene to an image buffer.
///
/// `camera` must already be initialized.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    integrator: &PathIntegrator,
    config: &RenderConfig,
) -> ImageBuffer {
    let start = Instant::now();
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let index = y as u64 * camera.image_width as u64 + x as u64;
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index));
            let color = render_pixel(
                camera,
                scene,
                integrator,
                x,
                y,
                config.samples_per_pixel,
                &mut rng,
            );
            image.set(x, y, color);
        }
    }

    log::info!(
        "Rendered {}x{} at {} spp in {:.2?}",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        start.elapsed()
    );
    image
}
