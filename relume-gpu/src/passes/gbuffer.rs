use glam::{UVec2, Vec3};

use crate::{Camera, Scene, Surface};

/// Per-pixel output of the geometry pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GBufferEntry {
    pub surface: Surface,

    /// Radiance that needs no resampling: emissive geometry (or the
    /// environment) seen directly through the pixel.
    pub direct: Vec3,
}

/// Traces the primary ray of given pixel and fills its G-Buffer entry.
pub fn eval_gbuffer(
    scene: &impl Scene,
    camera: &Camera,
    screen_pos: UVec2,
) -> GBufferEntry {
    let (origin, direction) = camera.ray(screen_pos);

    match scene.closest_hit(origin, direction) {
        Some(hit) => GBufferEntry {
            surface: Surface {
                point: hit.point,
                normal: hit.normal,
                view_direction: -direction,
                base_color: hit.base_color,
                roughness: hit.roughness,
                depth: hit.distance,
            },
            direct: hit.emission,
        },

        None => GBufferEntry {
            surface: Surface::default(),
            direct: scene.env_radiance(direction),
        },
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3};

    use super::*;
    use crate::testing::MockScene;
    use crate::SceneHit;

    #[test]
    fn hits_become_surfaces() {
        let scene = MockScene::default().with_hit(SceneHit {
            point: vec3(0.0, 0.0, 1.0),
            normal: Vec3::Z,
            distance: 4.0,
            base_color: vec3(0.8, 0.4, 0.2),
            roughness: 0.3,
            emission: Vec3::ZERO,
        });

        let camera = Camera::new(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(16, 16),
        );

        let entry = eval_gbuffer(&scene, &camera, uvec2(8, 8));

        assert!(entry.surface.is_some());
        assert_eq!(vec3(0.8, 0.4, 0.2), entry.surface.base_color);
        assert_eq!(4.0, entry.surface.depth);
        assert_eq!(Vec3::ZERO, entry.direct);
    }

    #[test]
    fn misses_shade_the_environment() {
        let scene = MockScene {
            env: vec3(0.1, 0.2, 0.3),
            ..MockScene::default()
        };

        let camera = Camera::new(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(16, 16),
        );

        let entry = eval_gbuffer(&scene, &camera, uvec2(0, 0));

        assert!(entry.surface.is_none());
        assert_eq!(vec3(0.1, 0.2, 0.3), entry.direct);
    }
}
