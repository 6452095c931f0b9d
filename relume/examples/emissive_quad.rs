//! Renders an emissive quad hovering over a diffuse floor and writes the
//! result to `emissive_quad.ppm`.

use std::fs::File;
use std::io::{BufWriter, Write};

use glam::{uvec2, vec3, Vec3};
use relume::{Camera, CpuScene, Material, Renderer, Settings, Triangle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

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

    for (center, half, material) in [
        (Vec3::ZERO, 4.0, floor),
        (vec3(0.0, 2.0, 0.0), 0.5, light),
    ] {
        let (a, b, c, d) = (
            center + vec3(-half, 0.0, -half),
            center + vec3(half, 0.0, -half),
            center + vec3(half, 0.0, half),
            center + vec3(-half, 0.0, half),
        );

        scene.add_triangle(Triangle { a, b, c, material_id: material });
        scene.add_triangle(Triangle { a, b: c, c: d, material_id: material });
    }

    let camera = Camera::new(
        vec3(0.0, 3.0, 6.0),
        vec3(0.0, 0.5, 0.0),
        Vec3::Y,
        1.0,
        uvec2(256, 256),
    );

    let mut renderer = Renderer::new(scene, camera, Settings::default())?;

    let mut image = Vec::new();

    for _ in 0..32 {
        image = renderer.render().to_vec();
    }

    let mut out = BufWriter::new(File::create("emissive_quad.ppm")?);

    writeln!(out, "P3\n256 256\n255")?;

    for radiance in image {
        let srgb = |value: f32| {
            (value.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0) as u8
        };

        writeln!(
            out,
            "{} {} {}",
            srgb(radiance.x),
            srgb(radiance.y),
            srgb(radiance.z),
        )?;
    }

    Ok(())
}
