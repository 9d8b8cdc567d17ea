//! Cornell box render.
//!
//! Usage: `cargo run --release --example cornell -- [config.json] [output.png]`
//!
//! The optional JSON file may set `integrator` and `render` sections, e.g.
//! `{"integrator": {"russian_roulette": 0.9}, "render": {"samples_per_pixel": 256}}`.

use anyhow::{Context, Result};
use lumen_tracer::{
    Camera, Color, DiffuseLight, IntegratorConfig, Lambertian, Material, PathIntegrator, Quad,
    RenderConfig, Scene, SceneBuilder, SceneResult, Sphere, TriangleMesh, Vec3,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExampleConfig {
    integrator: IntegratorConfig,
    render: RenderConfig,
    width: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => ExampleConfig {
            render: RenderConfig {
                samples_per_pixel: 64,
                seed: 0,
            },
            ..Default::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "cornell.png".to_string());

    let scene = build_scene().context("building Cornell box")?;
    let integrator = PathIntegrator::new(config.integrator)?;

    let size = config.width.unwrap_or(256);
    let mut camera = Camera::new()
        .with_resolution(size, size)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0), // look_from
            Vec3::new(278.0, 278.0, 0.0),    // look_at
            Vec3::Y,
        )
        .with_fov(40.0);
    camera.initialize();

    let image = lumen_tracer::render(&camera, &scene, &integrator, &config.render);
    log::info!("Mean radiance {:?}", image.average());

    let png = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("image buffer size mismatch")?;
    png.save(&output)
        .with_context(|| format!("writing {output}"))?;
    log::info!("Saved to {output}");

    Ok(())
}

fn build_scene() -> SceneResult<Scene> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 15.0)));

    let mut builder = SceneBuilder::new();

    // Walls
    builder.add(Quad::new(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    )?);
    builder.add(Quad::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    )?);
    builder.add(Quad::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )?);
    builder.add(Quad::new(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    )?);
    builder.add(Quad::new(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    )?);

    // Ceiling light, facing down into the box
    builder.add(Quad::new(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        light,
    )?);

    builder.add(Sphere::new(Vec3::new(190.0, 90.0, 190.0), 90.0, white.clone())?);
    builder.add(tetrahedron(Vec3::new(370.0, 0.0, 370.0), 160.0, white)?);

    Ok(builder.build())
}

/// Tetrahedron standing on the floor with its base centered on `base`.
fn tetrahedron(base: Vec3, size: f32, material: Arc<dyn Material>) -> SceneResult<TriangleMesh> {
    let r = size / 3f32.sqrt();
    let vertices = vec![
        base + Vec3::new(r, 0.0, 0.0),
        base + Vec3::new(-0.5 * r, 0.0, 0.5 * size),
        base + Vec3::new(-0.5 * r, 0.0, -0.5 * size),
        base + Vec3::new(0.0, size * (2.0f32 / 3.0).sqrt(), 0.0),
    ];
    let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
    TriangleMesh::new(vertices, triangles, material)
}
