//! End-to-end checks of the whole resampling pipeline against a brute-force
//! reference integrator sharing the same scene and camera.

use glam::{uvec2, vec3, UVec2, Vec3};
use relume::gpu::{eval_gbuffer, LightSample, Noise, Vec3Ext};
use relume::{
    BiasCorrection, Camera, CpuScene, Material, Renderer, Scene, Settings,
    Triangle,
};

const SCREEN: UVec2 = uvec2(24, 24);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn camera() -> Camera {
    Camera::new(vec3(0.0, 3.0, 4.0), Vec3::ZERO, Vec3::Y, 1.0, SCREEN)
}

fn quad(scene: &mut CpuScene, center: Vec3, half: f32, material_id: u32) {
    let (a, b, c, d) = (
        center + vec3(-half, 0.0, -half),
        center + vec3(half, 0.0, -half),
        center + vec3(half, 0.0, half),
        center + vec3(-half, 0.0, half),
    );

    scene.add_triangle(Triangle { a, b, c, material_id });
    scene.add_triangle(Triangle { a, b: c, c: d, material_id });
}

fn scene(with_blocker: bool) -> CpuScene {
    let mut scene = CpuScene::new();

    let floor = scene.add_material(Material {
        base_color: vec3(0.8, 0.7, 0.6),
        roughness: 1.0,
        emission: Vec3::ZERO,
    });

    let light = scene.add_material(Material {
        base_color: Vec3::ZERO,
        roughness: 1.0,
        emission: Vec3::splat(5.0),
    });

    quad(&mut scene, Vec3::ZERO, 2.0, floor);
    quad(&mut scene, vec3(0.0, 2.0, 0.0), 0.5, light);

    if with_blocker {
        quad(&mut scene, vec3(0.0, 1.0, 0.0), 0.6, floor);
    }

    scene
}

/// Ground-truth direct lighting: plain uniform light sampling, many samples,
/// visibility included.
fn brute_force(scene: &CpuScene, camera: &Camera, idx: usize, samples: u32) -> Vec3 {
    let entry = eval_gbuffer(scene, camera, camera.idx_to_screen(idx));

    if entry.surface.is_none() {
        return entry.direct;
    }

    let surface = &entry.surface;
    let mut noise = Noise::new(0xb4c0ffee, camera.idx_to_screen(idx), 0);
    let mut sum = Vec3::ZERO;

    for _ in 0..samples {
        let Some(sample) = scene.sample_emissive(&mut noise) else {
            break;
        };

        let light = LightSample::triangle(sample.triangle_id, sample.point);
        let (direction, distance) = light.direction_from(surface.point);

        let cos_light = (-direction).dot(sample.normal).max(0.0);
        let cos_surface = surface.normal.dot(direction).max(0.0);

        if cos_light <= 0.0 || cos_surface <= 0.0 {
            continue;
        }

        let origin = surface.point + surface.normal * 1.0e-4;

        if scene.is_occluded(origin, direction, distance) {
            continue;
        }

        let pdf = sample.pdf_area * distance * distance / cos_light;

        sum += scene.eval_bsdf(surface, direction)
            * scene.emission(sample.triangle_id)
            * cos_surface
            / pdf;
    }

    entry.direct + sum / (samples as f32)
}

fn reference_image(scene: &CpuScene, camera: &Camera) -> Vec<Vec3> {
    (0..camera.pixel_count())
        .map(|idx| brute_force(scene, camera, idx, 4096))
        .collect()
}

fn restir_image(scene: &CpuScene, settings: Settings, frames: u32) -> Vec<Vec3> {
    let mut renderer = Renderer::new(scene.clone(), camera(), settings).unwrap();

    let mut image = Vec::new();

    for _ in 0..frames {
        image = renderer.render().to_vec();
    }

    image
}

fn compare(image: &[Vec3], reference: &[Vec3]) {
    let mut compared = 0;
    let mut total_error = 0.0;

    for (idx, (ours, truth)) in image.iter().zip(reference).enumerate() {
        let truth_luma = truth.luma();

        // Skip black and deep-penumbra pixels; relative error is meaningless
        // when both estimators are mostly noise
        if truth_luma < 1.0e-2 {
            continue;
        }

        let error = (ours.luma() - truth_luma).abs() / truth_luma;

        assert!(
            error < 0.3,
            "pixel {idx}: got {ours:?}, expected {truth:?}",
        );

        compared += 1;
        total_error += error;
    }

    assert!(compared > 0);

    let mean_error = total_error / (compared as f32);

    assert!(mean_error < 0.05, "mean relative error {mean_error}");
}

#[test]
fn converges_to_the_reference_image() {
    init_logging();

    let scene = scene(false);
    let image = restir_image(&scene, Settings::default(), 64);

    compare(&image, &reference_image(&scene, &camera()));
}

#[test]
fn occlusion_is_respected() {
    init_logging();

    let scene = scene(true);
    let camera = camera();
    let image = restir_image(&scene, Settings::default(), 64);

    compare(&image, &reference_image(&scene, &camera));

    // The floor center cannot see any part of the light past the blocker,
    // while the oblique camera still sees the floor center past it
    let pixel_at = |point| {
        let pos: glam::Vec2 = camera.world_to_screen(point).unwrap();

        camera.screen_to_idx(uvec2(
            pos.x.round() as u32,
            pos.y.round() as u32,
        ))
    };

    let shadowed = pixel_at(vec3(0.0, 0.0, 0.0));
    let lit = pixel_at(vec3(1.5, 0.0, 1.5));

    assert!(
        image[shadowed].luma() < 0.01,
        "expected full shadow, got {:?}",
        image[shadowed],
    );

    assert!(image[lit].luma() > 0.05);

    // The shadow must also hold in modes without the inter-pass visibility
    // fixup, where only the final shadow ray catches occluded survivors
    let settings = Settings {
        bias_correction: BiasCorrection::MisLike,
        ..Settings::default()
    };

    let image = restir_image(&scene, settings, 64);

    assert!(
        image[shadowed].luma() < 0.01,
        "expected full shadow, got {:?}",
        image[shadowed],
    );

    assert!(image[lit].luma() > 0.05);
}

#[test]
fn unbiased_modes_agree() {
    init_logging();

    let scene = scene(false);
    let frames = 32;

    let mean = |mode| {
        let settings = Settings {
            bias_correction: mode,
            ..Settings::default()
        };

        let image = restir_image(&scene, settings, frames);

        let lumas: Vec<_> = image
            .iter()
            .map(|radiance| radiance.luma())
            .filter(|luma| *luma > 1.0e-3)
            .collect();

        lumas.iter().sum::<f32>() / (lumas.len() as f32)
    };

    let baseline = mean(BiasCorrection::OneOverZ);

    assert!(baseline > 0.0);

    for mode in [
        BiasCorrection::MisLike,
        BiasCorrection::MisLikeConfidence,
        BiasCorrection::Gbh,
        BiasCorrection::GbhConfidence,
    ] {
        let mean = mean(mode);
        let diff = (mean - baseline).abs() / baseline;

        assert!(
            diff < 0.06,
            "{mode:?}: mean {mean} vs baseline {baseline}",
        );
    }
}
