//! The BVH must return exactly what a linear scan returns.

use lumen_tracer::{
    DiffuseLight, Interval, Lambertian, Material, Quad, Ray, Scene, SceneBuilder, Sphere,
    TriangleMesh, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn random_ray(rng: &mut StdRng) -> Ray {
    loop {
        let direction = random_point(rng, 1.0);
        if direction.length() > 0.1 {
            return Ray::new(random_point(rng, 10.0), direction);
        }
    }
}

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// Spheres, quads and a small mesh scattered through a 20 unit cube.
fn cluttered_scene(seed: u64) -> Scene {
    let mut rng = StdRng::seed_from_u64(seed);
    let grey: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(0.5)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Vec3::splat(5.0)));
    let mut builder = SceneBuilder::new();

    for i in 0..40 {
        let material = if i % 7 == 0 { light.clone() } else { grey.clone() };
        let radius = rng.gen_range(0.2..1.5);
        builder.add(Sphere::new(random_point(&mut rng, 8.0), radius, material).unwrap());
    }

    for _ in 0..12 {
        let u = random_point(&mut rng, 2.0);
        let v = random_point(&mut rng, 2.0);
        if let Ok(quad) = Quad::new(random_point(&mut rng, 8.0), u, v, grey.clone()) {
            builder.add(quad);
        }
    }

    // Folded strip, so rays can cross several of its triangles
    let vertices = (0..8)
        .map(|i| {
            let x = i as f32 - 4.0;
            let y = if i % 2 == 0 { 0.0 } else { 1.0 };
            Vec3::new(x, y, (i / 2) as f32)
        })
        .collect();
    let triangles = (0..6).map(|i| [i, i + 1, i + 2]).collect();
    builder.add(TriangleMesh::new(vertices, triangles, grey).unwrap());

    builder.build()
}

#[test]
fn bvh_matches_linear_scan() {
    let scene = cluttered_scene(11);
    let mut rng = StdRng::seed_from_u64(12);
    let range = Interval::from_min(1e-3);
    let mut hits = 0;

    for _ in 0..5000 {
        let ray = random_ray(&mut rng);
        let fast = scene.intersect(&ray, range);
        let slow = scene.trace(&ray, range);

        match (fast, slow) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                hits += 1;
                assert_eq!(a.object_id, b.object_id);
                assert_eq!(a.sub_index, b.sub_index);
                assert_eq!(a.distance, b.distance);
                assert_eq!(a.coords, b.coords);
                assert_eq!(a.normal, b.normal);
            }
            (a, b) => panic!("bvh {a:?} disagrees with scan {b:?} for {ray:?}"),
        }
    }

    // The comparison is only meaningful if a good share of rays hit
    assert!(hits > 500, "only {hits} hits");
}

#[test]
fn bvh_respects_range() {
    let scene = cluttered_scene(21);
    let mut rng = StdRng::seed_from_u64(22);

    for _ in 0..2000 {
        let ray = random_ray(&mut rng);
        let max = rng.gen_range(0.5..10.0);
        let range = Interval::new(1e-3, max);

        let fast = scene.intersect(&ray, range).map(|hit| (hit.object_id, hit.distance));
        let slow = scene.trace(&ray, range).map(|hit| (hit.object_id, hit.distance));
        assert_eq!(fast, slow);
        if let Some((_, distance)) = fast {
            assert!(distance > 1e-3 && distance < max);
        }
    }
}

#[test]
fn empty_scene_never_hits() {
    let scene = SceneBuilder::new().build();
    let ray = Ray::new(Vec3::ZERO, Vec3::X);

    assert!(scene.intersect(&ray, Interval::from_min(0.0)).is_none());
    assert!(scene.trace(&ray, Interval::from_min(0.0)).is_none());
}
