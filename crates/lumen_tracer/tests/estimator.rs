//! Radiance estimates checked against closed-form answers.

use approx::assert_abs_diff_eq;
use lumen_tracer::{
    Aabb, Color, DiffuseLight, Hit, Hittable, IntegratorConfig, Interval, Lambertian, LightPdf,
    Material, PathIntegrator, Quad, Ray, Scene, SceneBuilder, Sphere, SurfacePoint,
    SurfaceSample, Vec3,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::f32::consts::PI;
use std::sync::Arc;

const RADIANCE: f32 = 4.0;
const ALBEDO: f32 = 0.5;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Area light that always hands out its center point.
///
/// Intersection is the real quad, so shadow rays still find it, but the
/// light sample is deterministic and the estimate has no variance.
struct CenterSampled(Quad);

impl Hittable for CenterSampled {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        self.0.intersect(ray, ray_t)
    }

    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint {
        self.0.surface(ray, hit)
    }

    fn bounding_box(&self) -> Aabb {
        self.0.bounding_box()
    }

    fn area(&self) -> f32 {
        self.0.area()
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> SurfaceSample {
        SurfaceSample {
            point: self.0.center(),
            normal: self.0.normal(),
            pdf: 1.0 / self.0.area(),
        }
    }

    fn material(&self) -> &dyn Material {
        self.0.material()
    }
}

/// Downward facing `width` x `depth` light whose corner is at `corner`.
fn ceiling_light(corner: Vec3, width: f32, depth: f32) -> Quad {
    Quad::new(
        corner,
        Vec3::new(width, 0.0, 0.0),
        Vec3::new(0.0, 0.0, depth),
        Arc::new(DiffuseLight::new(Color::splat(RADIANCE))),
    )
    .unwrap()
}

fn floor() -> Quad {
    Quad::new(
        Vec3::new(-100.0, 0.0, -100.0),
        Vec3::new(0.0, 0.0, 200.0),
        Vec3::new(200.0, 0.0, 0.0),
        Arc::new(Lambertian::new(Color::splat(ALBEDO))),
    )
    .unwrap()
}

fn integrator(russian_roulette: f32, light_pdf: LightPdf) -> PathIntegrator {
    PathIntegrator::new(IntegratorConfig {
        russian_roulette,
        light_pdf,
        ..Default::default()
    })
    .unwrap()
}

/// Ray that lands on the floor at the origin.
fn floor_ray() -> Ray {
    Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y)
}

/// Form factor from a differential area at the origin facing up to an
/// axis-aligned rectangle at height `h` spanning `[x0, x1] x [z0, z1]`.
fn rectangle_form_factor(h: f32, x0: f32, x1: f32, z0: f32, z1: f32) -> f32 {
    // Corner formula for a rectangle with one corner right above the point
    let corner = |a: f32, b: f32| {
        let sign = a.signum() * b.signum();
        let (a, b) = (a.abs() / h, b.abs() / h);
        let sa = (1.0 + a * a).sqrt();
        let sb = (1.0 + b * b).sqrt();
        sign * (a / sa * (b / sa).atan() + b / sb * (a / sb).atan()) / (2.0 * PI)
    };
    corner(x1, z1) - corner(x0, z1) - corner(x1, z0) + corner(x0, z0)
}

fn mean_radiance(scene: &Scene, integrator: &PathIntegrator, samples: u32, seed: u64) -> f32 {
    let mut rng = StdRng::seed_from_u64(seed);
    let ray = floor_ray();
    let total: Color = (0..samples)
        .map(|_| integrator.estimate(scene, &ray, 0, &mut rng))
        .sum();
    total.x / samples as f32
}

#[test]
fn fixed_light_sample_gives_exact_direct_term() {
    init_logging();
    let mut builder = SceneBuilder::new();
    builder.add(CenterSampled(ceiling_light(Vec3::new(-1.0, 2.0, -1.0), 2.0, 2.0)));
    builder.add(floor());
    let scene = builder.build();

    // L * (rho / pi) * cos * cos / d^2 * area, both cosines 1
    let expected = RADIANCE * ALBEDO / PI * 4.0 / 4.0;

    let mut rng = StdRng::seed_from_u64(3);
    let result =
        integrator(0.0, LightPdf::PerObject).trace_path(&scene, &floor_ray(), 0, &mut rng);
    assert_abs_diff_eq!(result.radiance.x, expected, epsilon = 1e-5);
    assert_eq!(result.bounces, 0);
}

#[test]
fn bounce_onto_light_is_not_counted_twice() {
    init_logging();
    let mut builder = SceneBuilder::new();
    builder.add(CenterSampled(ceiling_light(Vec3::new(-1.0, 2.0, -1.0), 2.0, 2.0)));
    builder.add(floor());
    let scene = builder.build();
    let expected = RADIANCE * ALBEDO / PI;

    // Every bounce off the floor either escapes or reaches the light, so
    // with roulette on the estimate must still be exactly the direct term
    let integrator = integrator(0.8, LightPdf::PerObject);
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..500 {
        let result = integrator.trace_path(&scene, &floor_ray(), 0, &mut rng);
        assert_abs_diff_eq!(result.radiance.x, expected, epsilon = 1e-5);
        assert_eq!(result.bounces, 0);
    }
}

#[test]
fn area_light_matches_form_factor() {
    init_logging();
    let mut builder = SceneBuilder::new();
    builder.add(ceiling_light(Vec3::new(-1.0, 2.0, -1.0), 2.0, 2.0));
    builder.add(floor());
    let scene = builder.build();

    let expected = ALBEDO * RADIANCE * rectangle_form_factor(2.0, -1.0, 1.0, -1.0, 1.0);
    let estimate = mean_radiance(&scene, &integrator(0.0, LightPdf::PerObject), 20_000, 5);

    assert_abs_diff_eq!(estimate, expected, epsilon = expected * 0.01);
}

#[test]
fn light_pdf_modes_with_unequal_lights() {
    init_logging();
    // Unit light on the left, 1x3 light on the right
    let small = (-1.5, -0.5, -0.5, 0.5);
    let large = (0.5, 1.5, -1.5, 1.5);

    let mut builder = SceneBuilder::new();
    builder.add(ceiling_light(Vec3::new(small.0, 2.0, small.2), 1.0, 1.0));
    builder.add(ceiling_light(Vec3::new(large.0, 2.0, large.2), 1.0, 3.0));
    builder.add(floor());
    let scene = builder.build();
    assert_abs_diff_eq!(scene.emissive_area(), 4.0, epsilon = 1e-5);

    let from = |(x0, x1, z0, z1): (f32, f32, f32, f32)| {
        ALBEDO * RADIANCE * rectangle_form_factor(2.0, x0, x1, z0, z1)
    };
    let exact = from(small) + from(large);
    // Each light is picked by area but weighted as if it were the only one
    let per_object = 0.25 * from(small) + 0.75 * from(large);

    let mixture = mean_radiance(&scene, &integrator(0.0, LightPdf::Mixture), 40_000, 6);
    assert_abs_diff_eq!(mixture, exact, epsilon = exact * 0.02);

    let observed = mean_radiance(&scene, &integrator(0.0, LightPdf::PerObject), 40_000, 7);
    assert_abs_diff_eq!(observed, per_object, epsilon = per_object * 0.02);
    assert!(observed < exact * 0.8);
}

#[test]
fn path_length_is_geometric() {
    init_logging();
    // Closed, unlit sphere: every bounce finds another surface, so only the
    // roulette ends the path
    let mut builder = SceneBuilder::new();
    let grey = Arc::new(Lambertian::new(Color::splat(0.5)));
    builder.add(Sphere::new(Vec3::ZERO, 5.0, grey).unwrap());
    let scene = builder.build();

    let integrator = integrator(0.8, LightPdf::PerObject);
    let mut rng = StdRng::seed_from_u64(8);
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.2, 1.0, -0.4));

    let paths = 20_000;
    let mut total = 0u64;
    let mut zero = 0u32;
    for _ in 0..paths {
        let result = integrator.trace_path(&scene, &ray, 0, &mut rng);
        assert_eq!(result.radiance, Color::ZERO);
        total += result.bounces as u64;
        if result.bounces == 0 {
            zero += 1;
        }
    }

    let mean = total as f32 / paths as f32;
    assert_abs_diff_eq!(mean, 4.0, epsilon = 0.15);
    assert_abs_diff_eq!(zero as f32 / paths as f32, 0.2, epsilon = 0.01);
}

#[test]
fn no_emitters_means_darkness() {
    init_logging();
    let mut builder = SceneBuilder::new();
    builder.add(floor());
    let white = Arc::new(Lambertian::new(Color::ONE));
    builder.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.5, white).unwrap());
    let scene = builder.build();
    assert_eq!(scene.emissive_area(), 0.0);

    let integrator = integrator(0.8, LightPdf::PerObject);
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..200 {
        let ray = Ray::new(Vec3::new(0.0, 3.0, 2.0), Vec3::new(0.0, -1.0, -0.8));
        assert_eq!(integrator.estimate(&scene, &ray, 0, &mut rng), Color::ZERO);
    }
}

/// Reflects like a white diffuse surface but reports a zero sampling density.
struct ZeroDensity;

impl Material for ZeroDensity {
    fn eval(&self, _incoming: Vec3, outgoing: Vec3, normal: Vec3) -> Color {
        if outgoing.dot(normal) > 0.0 {
            Color::ONE / PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _incoming: Vec3, normal: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        normal
    }

    fn pdf(&self, _incoming: Vec3, _outgoing: Vec3, _normal: Vec3) -> f32 {
        0.0
    }
}

/// Area light that reports a fixed density for every sample.
struct FixedDensityLight(Quad, f32);

impl Hittable for FixedDensityLight {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        self.0.intersect(ray, ray_t)
    }

    fn surface(&self, ray: &Ray, hit: &Hit) -> SurfacePoint {
        self.0.surface(ray, hit)
    }

    fn bounding_box(&self) -> Aabb {
        self.0.bounding_box()
    }

    fn area(&self) -> f32 {
        self.0.area()
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> SurfaceSample {
        SurfaceSample {
            point: self.0.center(),
            normal: self.0.normal(),
            pdf: self.1,
        }
    }

    fn material(&self) -> &dyn Material {
        self.0.material()
    }
}

/// Closed room with a zero-density wall and a lamp of the given sample
/// density hanging from the ceiling.
fn degenerate_room(light_pdf: f32) -> Scene {
    let mut builder = SceneBuilder::new();
    builder.add(Sphere::new(Vec3::ZERO, 5.0, Arc::new(ZeroDensity)).unwrap());
    let lamp = ceiling_light(Vec3::new(-1.0, 4.0, -1.0), 2.0, 2.0);
    builder.add(FixedDensityLight(lamp, light_pdf));
    builder.build()
}

/// Every path from the room's floor must come back black after zero bounces.
fn assert_dark(scene: &Scene, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    // Looking down at the floor, away from the lamp
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.1, -1.0, 0.2));
    for light_pdf in [LightPdf::PerObject, LightPdf::Mixture] {
        let integrator = integrator(0.8, light_pdf);
        for _ in 0..1000 {
            let result = integrator.trace_path(scene, &ray, 0, &mut rng);
            assert!(result.radiance.is_finite());
            assert_eq!(result.radiance, Color::ZERO);
            assert_eq!(result.bounces, 0);
        }
    }
}

#[test]
fn zero_densities_contribute_nothing() {
    init_logging();
    let scene = degenerate_room(0.0);
    assert_abs_diff_eq!(scene.emissive_area(), 4.0, epsilon = 1e-5);

    let mut rng = StdRng::seed_from_u64(10);
    for mode in [LightPdf::PerObject, LightPdf::Mixture] {
        assert!(scene.sample_light(&mut rng, mode).is_none());
    }
    assert_dark(&scene, 11);
}

#[test]
fn overflowing_direct_term_is_dropped() {
    init_logging();
    // Smallest positive density: the sample is accepted, but dividing by it
    // overflows to infinity
    let tiny = f32::from_bits(1);
    let scene = degenerate_room(tiny);

    let mut rng = StdRng::seed_from_u64(12);
    let sample = scene.sample_light(&mut rng, LightPdf::PerObject).unwrap();
    assert_eq!(sample.pdf, tiny);
    assert_dark(&scene, 13);
}

#[test]
fn parallel_estimates_match_sequential() {
    init_logging();
    let mut builder = SceneBuilder::new();
    builder.add(ceiling_light(Vec3::new(-1.0, 2.0, -1.0), 2.0, 2.0));
    builder.add(floor());
    let grey = Arc::new(Lambertian::new(Color::splat(0.8)));
    builder.add(Sphere::new(Vec3::new(0.5, 0.5, 0.5), 0.5, grey).unwrap());
    let scene = builder.build();
    let integrator = integrator(0.8, LightPdf::Mixture);

    let estimate = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        integrator.estimate(&scene, &floor_ray(), 0, &mut rng)
    };

    let sequential: Vec<Color> = (0..256).map(estimate).collect();
    let parallel: Vec<Color> = (0..256u64).into_par_iter().map(estimate).collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn config_round_trips_through_json() {
    let config = IntegratorConfig {
        russian_roulette: 0.5,
        max_depth: Some(12),
        light_pdf: LightPdf::Mixture,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"mixture\""));
    let parsed: IntegratorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);

    // Missing fields fall back to defaults
    let partial: IntegratorConfig =
        serde_json::from_str(r#"{"russian_roulette": 0.25}"#).unwrap();
    assert_eq!(partial.russian_roulette, 0.25);
    assert_eq!(partial.light_pdf, LightPdf::PerObject);
    assert_eq!(partial.max_depth, None);
}
