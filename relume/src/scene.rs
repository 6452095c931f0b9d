use glam::Vec3;
use relume_gpu::{EmissiveSample, Noise, Scene, SceneHit, Surface};

use std::f32::consts::PI;

const HIT_EPSILON: f32 = 1.0e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Material {
    pub base_color: Vec3,
    pub roughness: f32,
    pub emission: Vec3,
}

impl Material {
    pub fn is_emissive(&self) -> bool {
        self.emission != Vec3::ZERO
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub material_id: u32,
}

impl Triangle {
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize()
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.b - self.a).cross(self.c - self.a).length()
    }

    /// Möller-Trumbore; returns the hit distance, if any.
    fn hit(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;

        let p = direction.cross(e2);
        let det = e1.dot(p);

        if det.abs() < 1.0e-8 {
            return None;
        }

        let inv_det = 1.0 / det;
        let to_origin = origin - self.a;

        let u = to_origin.dot(p) * inv_det;

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = to_origin.cross(e1);
        let v = direction.dot(q) * inv_det;

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) * inv_det;

        (t > HIT_EPSILON).then_some(t)
    }
}

/// Triangle soup with Lambertian materials and a constant environment;
/// closest-hit and shadow rays are resolved by a linear scan.
///
/// This is deliberately the simplest thing satisfying [`Scene`] - the
/// resampling pipeline does not care how rays get answered, only that the
/// answers are deterministic.
#[derive(Clone, Debug, Default)]
pub struct CpuScene {
    triangles: Vec<Triangle>,
    materials: Vec<Material>,
    emissive: Vec<u32>,
    env: Vec3,
}

impl CpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: Vec3) -> Self {
        self.env = env;
        self
    }

    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);

        (self.materials.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, triangle: Triangle) -> u32 {
        let id = self.triangles.len() as u32;

        if self.materials[triangle.material_id as usize].is_emissive() {
            self.emissive.push(id);
        }

        self.triangles.push(triangle);
        id
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn material_of(&self, triangle_id: u32) -> &Material {
        let triangle = &self.triangles[triangle_id as usize];

        &self.materials[triangle.material_id as usize]
    }
}

impl Scene for CpuScene {
    fn closest_hit(&self, origin: Vec3, direction: Vec3) -> Option<SceneHit> {
        let mut closest: Option<(u32, f32)> = None;

        for (id, triangle) in self.triangles.iter().enumerate() {
            if let Some(t) = triangle.hit(origin, direction) {
                if closest.map_or(true, |(_, best)| t < best) {
                    closest = Some((id as u32, t));
                }
            }
        }

        closest.map(|(id, t)| {
            let triangle = &self.triangles[id as usize];
            let material = self.material_of(id);

            let normal = triangle.normal();

            // Shade the side the ray arrived at
            let normal = if direction.dot(normal) > 0.0 {
                -normal
            } else {
                normal
            };

            SceneHit {
                point: origin + direction * t,
                normal,
                distance: t,
                base_color: material.base_color,
                roughness: material.roughness,
                emission: material.emission,
            }
        })
    }

    fn is_occluded(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool {
        self.triangles.iter().any(|triangle| {
            triangle
                .hit(origin, direction)
                .is_some_and(|t| t < distance - HIT_EPSILON)
        })
    }

    fn eval_bsdf(&self, surface: &Surface, direction: Vec3) -> Vec3 {
        if direction.dot(surface.normal) > 0.0 {
            surface.base_color / PI
        } else {
            Vec3::ZERO
        }
    }

    fn emission(&self, triangle_id: u32) -> Vec3 {
        self.material_of(triangle_id).emission
    }

    fn light_normal(&self, triangle_id: u32) -> Vec3 {
        self.triangles[triangle_id as usize].normal()
    }

    fn env_radiance(&self, _direction: Vec3) -> Vec3 {
        self.env
    }

    fn sample_emissive(&self, noise: &mut Noise) -> Option<EmissiveSample> {
        if self.emissive.is_empty() {
            return None;
        }

        let id =
            self.emissive[(noise.sample_int() as usize) % self.emissive.len()];

        let triangle = &self.triangles[id as usize];

        // Uniform barycentric point
        let mut u = noise.sample();
        let mut v = noise.sample();

        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }

        let point =
            triangle.a + (triangle.b - triangle.a) * u + (triangle.c - triangle.a) * v;

        Some(EmissiveSample {
            triangle_id: id,
            point,
            normal: triangle.normal(),
            pdf_area: 1.0 / ((self.emissive.len() as f32) * triangle.area()),
        })
    }
}
