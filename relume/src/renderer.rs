use std::mem;

use glam::Vec3;
use rayon::prelude::*;
use relume_gpu::{
    eval_gbuffer, reuse_spatial, reuse_temporal, reuse_visibility,
    sample_initial_candidates, shade, BiasCorrection, Camera, ConvergedGate,
    DiReservoir, DiReservoirData, Noise, Scene, Settings, SpatialContext,
    Surface,
};
use thiserror::Error;

use crate::DoubleBuffered;

/// Configuration problems surface here, once, when the renderer is built;
/// the per-pixel kernels never validate anything at runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error("viewport cannot be empty")]
    EmptyViewport,

    #[error("the initial pass needs at least one light candidate")]
    NoLightCandidates,

    #[error("m-cap cannot be negative, got {0}")]
    InvalidMCap(f32),

    #[error("jacobian ratio limit must be at least 1.0, got {0}")]
    InvalidJacobianRatio(f32),

    #[error("converged-reuse probability must lie within <0.0, 1.0>, got {0}")]
    InvalidReuseProbability(f32),

    #[error("viewport cannot be resized after construction")]
    ViewportResized,
}

/// Frame pipeline: owns the scene, the settings and every per-pixel buffer,
/// and runs the passes in order, one frame per [`Self::render()`] call.
///
/// Pixels are fully independent, so each pass is a parallel map over the
/// viewport; passes that read neighboring pixels read the previous pass's
/// output buffer and write a separate one.
pub struct Renderer<S> {
    scene: S,
    settings: Settings,
    camera: Camera,
    prev_camera: Camera,
    frame: u32,

    /// Frames accumulated since the last [`Self::reset_accumulation()`].
    accum_frames: u32,

    surfaces: DoubleBuffered<Surface>,
    direct: Vec<Vec3>,

    /// Previous frame's final reservoirs, kept in their at-rest layout so
    /// that a SIMT backend could share the buffer; consumed by temporal
    /// reuse.
    history: Vec<DiReservoirData>,

    /// Within-frame ping-pong pair.
    curr: Vec<DiReservoir>,
    next: Vec<DiReservoir>,

    converged: Vec<bool>,

    accum: Vec<Vec3>,
    output: Vec<Vec3>,
}

impl<S> Renderer<S>
where
    S: Scene + Sync,
{
    pub fn new(scene: S, camera: Camera, settings: Settings) -> Result<Self, Error> {
        let pixels = camera.pixel_count();

        if pixels == 0 {
            return Err(Error::EmptyViewport);
        }

        if settings.initial.light_candidates == 0 {
            return Err(Error::NoLightCandidates);
        }

        if settings.m_cap < 0.0 {
            return Err(Error::InvalidMCap(settings.m_cap));
        }

        if settings.spatial.jacobian_max_ratio < 1.0 {
            return Err(Error::InvalidJacobianRatio(
                settings.spatial.jacobian_max_ratio,
            ));
        }

        if !(0.0..=1.0).contains(&settings.spatial.converged_reuse_probability) {
            return Err(Error::InvalidReuseProbability(
                settings.spatial.converged_reuse_probability,
            ));
        }

        log::info!(
            "initializing; viewport {}x{}, bias correction {:?}",
            camera.screen.x,
            camera.screen.y,
            settings.bias_correction,
        );

        Ok(Self {
            scene,
            settings,
            camera,
            prev_camera: camera,
            frame: 0,
            accum_frames: 0,
            surfaces: DoubleBuffered::new(pixels),
            direct: vec![Vec3::ZERO; pixels],
            history: vec![
                DiReservoirData::pack(DiReservoir::default());
                pixels
            ],
            curr: vec![DiReservoir::default(); pixels],
            next: vec![DiReservoir::default(); pixels],
            converged: vec![false; pixels],
            accum: vec![Vec3::ZERO; pixels],
            output: vec![Vec3::ZERO; pixels],
        })
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Moves the camera; the viewport must keep its size.
    ///
    /// Accumulation restarts, since previously accumulated radiance belongs
    /// to another view; reservoir history survives and gets reprojected.
    pub fn set_camera(&mut self, camera: Camera) -> Result<(), Error> {
        if camera.screen != self.camera.screen {
            return Err(Error::ViewportResized);
        }

        self.camera = camera;
        self.reset_accumulation();

        Ok(())
    }

    /// Per-pixel convergence flags driving the converged-neighbor gate of
    /// spatial reuse; all false unless the caller runs adaptive sampling.
    pub fn converged_mut(&mut self) -> &mut [bool] {
        &mut self.converged
    }

    pub fn reset_accumulation(&mut self) {
        self.accum.fill(Vec3::ZERO);
        self.accum_frames = 0;
    }

    /// Renders one frame and returns the accumulated per-pixel radiance,
    /// indexed by [`Camera::screen_to_idx()`].
    pub fn render(&mut self) -> &[Vec3] {
        log::debug!("rendering frame {}", self.frame);

        self.geometry_pass();
        self.initial_pass();

        if self.settings.temporal.enabled && self.frame > 0 {
            self.temporal_pass();
        }

        for pass in 0..self.settings.spatial.pass_count {
            self.spatial_pass(pass);
        }

        self.shading_pass();

        // This frame's reservoirs become the next frame's history
        self.history
            .par_iter_mut()
            .zip(self.curr.par_iter())
            .for_each(|(history, reservoir)| {
                *history = DiReservoirData::pack(*reservoir);
            });

        self.prev_camera = self.camera;
        self.frame += 1;
        self.accum_frames += 1;

        &self.output
    }

    /// Builds one pixel's random stream for the pass tagged `tag`; distinct
    /// tags keep passes of the same frame decorrelated.
    fn pass_noise(
        seed: u32,
        camera: &Camera,
        frame: u32,
        tag: u32,
        idx: usize,
    ) -> Noise {
        Noise::new(
            seed ^ tag.wrapping_mul(0x9e37_79b9),
            camera.idx_to_screen(idx),
            frame,
        )
    }

    fn geometry_pass(&mut self) {
        let scene = &self.scene;
        let camera = self.camera;

        self.surfaces
            .write()
            .par_iter_mut()
            .zip(self.direct.par_iter_mut())
            .enumerate()
            .for_each(|(idx, (surface, direct))| {
                let entry =
                    eval_gbuffer(scene, &camera, camera.idx_to_screen(idx));

                *surface = entry.surface;
                *direct = entry.direct;
            });

        self.surfaces.swap();
    }

    fn initial_pass(&mut self) {
        let scene = &self.scene;
        let settings = &self.settings;
        let camera = self.camera;
        let frame = self.frame;
        let surfaces = self.surfaces.curr();

        self.curr
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, reservoir)| {
                let mut noise =
                    Self::pass_noise(settings.seed, &camera, frame, 1, idx);

                *reservoir = sample_initial_candidates(
                    scene,
                    &settings.initial,
                    &surfaces[idx],
                    &mut noise,
                );

                if settings.initial.visibility_reuse {
                    reuse_visibility(scene, &surfaces[idx], reservoir);
                }
            });
    }

    fn temporal_pass(&mut self) {
        let scene = &self.scene;
        let settings = &self.settings;
        let camera = self.camera;
        let frame = self.frame;
        let prev_camera = self.prev_camera;
        let surfaces = self.surfaces.curr();
        let prev_surfaces = self.surfaces.prev();
        let history = &self.history;
        let input = &self.curr;

        self.next
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, reservoir)| {
                let mut noise =
                    Self::pass_noise(settings.seed, &camera, frame, 2, idx);

                *reservoir = reuse_temporal(
                    scene,
                    settings,
                    &prev_camera,
                    &surfaces[idx],
                    prev_surfaces,
                    history,
                    input[idx],
                    &mut noise,
                );
            });

        mem::swap(&mut self.curr, &mut self.next);
    }

    fn spatial_pass(&mut self, pass: u32) {
        let scene = &self.scene;
        let settings = &self.settings;
        let camera = self.camera;
        let frame = self.frame;
        let surfaces = self.surfaces.curr();
        let input = &self.curr;

        let gate = if settings.spatial.allow_converged_reuse {
            ConvergedGate::Probabilistic {
                converged: &self.converged,
                reuse_probability: settings.spatial.converged_reuse_probability,
            }
        } else {
            ConvergedGate::Reject {
                converged: &self.converged,
            }
        };

        self.next
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, reservoir)| {
                let mut noise = Self::pass_noise(
                    settings.seed,
                    &camera,
                    frame,
                    3 + pass,
                    idx,
                );

                let rotation = noise.sample_circle();
                let gate_noise = noise.fork();

                let ctx = SpatialContext {
                    center_pos: camera.idx_to_screen(idx),
                    center_idx: idx,
                    screen_size: camera.screen,
                    neighbor_count: settings.spatial.neighbor_count,
                    radius: settings.spatial.radius,
                    rotation,
                    gate,
                    gate_noise,
                    similarity: settings.similarity,
                    surfaces,
                    reservoirs: input,
                };

                *reservoir = reuse_spatial(scene, settings, &ctx, &mut noise);
            });

        mem::swap(&mut self.curr, &mut self.next);

        // With 1/Z and multiple iterations, the next iteration's "who could
        // have produced this sample" counting assumes visible samples, so
        // occluded survivors have to be discarded between iterations
        let fixup = settings.bias_correction == BiasCorrection::OneOverZ
            && settings.spatial.pass_count > 1;

        if fixup {
            self.curr
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, reservoir)| {
                    reuse_visibility(scene, &surfaces[idx], reservoir);
                });
        }
    }

    fn shading_pass(&mut self) {
        let scene = &self.scene;
        let surfaces = self.surfaces.curr();
        let direct = &self.direct;
        let reservoirs = &self.curr;
        let frames = (self.accum_frames + 1) as f32;

        self.accum
            .par_iter_mut()
            .zip(self.output.par_iter_mut())
            .enumerate()
            .for_each(|(idx, (accum, output))| {
                *accum += shade(
                    scene,
                    &surfaces[idx],
                    direct[idx],
                    &reservoirs[idx],
                );

                *output = *accum / frames;
            });
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3};

    use super::*;
    use crate::{CpuScene, Material, Triangle};

    fn camera() -> Camera {
        Camera::new(
            vec3(0.0, 3.0, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(8, 8),
        )
    }

    fn scene() -> CpuScene {
        let mut scene = CpuScene::new();

        let floor = scene.add_material(Material {
            base_color: Vec3::splat(0.8),
            roughness: 1.0,
            emission: Vec3::ZERO,
        });

        let light = scene.add_material(Material {
            base_color: Vec3::ZERO,
            roughness: 1.0,
            emission: Vec3::splat(5.0),
        });

        scene.add_triangle(Triangle {
            a: vec3(-3.0, 0.0, -3.0),
            b: vec3(3.0, 0.0, -3.0),
            c: vec3(3.0, 0.0, 3.0),
            material_id: floor,
        });

        scene.add_triangle(Triangle {
            a: vec3(-0.5, 2.0, -0.5),
            b: vec3(0.5, 2.0, -0.5),
            c: vec3(0.5, 2.0, 0.5),
            material_id: light,
        });

        scene
    }

    #[test]
    fn invalid_settings_are_rejected_at_construction() {
        let settings = Settings {
            initial: relume_gpu::InitialSettings {
                light_candidates: 0,
                ..Default::default()
            },
            ..Settings::default()
        };

        assert!(matches!(
            Renderer::new(scene(), camera(), settings),
            Err(Error::NoLightCandidates),
        ));

        let settings = Settings {
            m_cap: -1.0,
            ..Settings::default()
        };

        assert!(matches!(
            Renderer::new(scene(), camera(), settings),
            Err(Error::InvalidMCap(_)),
        ));

        let mut settings = Settings::default();

        settings.spatial.jacobian_max_ratio = 0.5;

        assert!(matches!(
            Renderer::new(scene(), camera(), settings),
            Err(Error::InvalidJacobianRatio(_)),
        ));

        let mut settings = Settings::default();

        settings.spatial.converged_reuse_probability = 1.5;

        assert!(matches!(
            Renderer::new(scene(), camera(), settings),
            Err(Error::InvalidReuseProbability(_)),
        ));
    }

    #[test]
    fn rendering_is_reproducible_for_a_fixed_seed() {
        let frames = |seed| {
            let settings = Settings {
                seed,
                ..Settings::default()
            };

            let mut renderer =
                Renderer::new(scene(), camera(), settings).unwrap();

            let mut out = Vec::new();

            for _ in 0..3 {
                out = renderer.render().to_vec();
            }

            out
        };

        assert_eq!(frames(123), frames(123));
        assert_ne!(frames(123), frames(321));
    }

    #[test]
    fn moving_the_camera_restarts_accumulation() {
        let mut renderer =
            Renderer::new(scene(), camera(), Settings::default()).unwrap();

        renderer.render();
        renderer.render();

        let moved = Camera::new(
            vec3(0.5, 3.0, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(8, 8),
        );

        renderer.set_camera(moved).unwrap();

        let first = renderer.render().to_vec();

        // One frame of accumulation only
        assert_eq!(3, renderer.frame());
        assert!(first.iter().any(|radiance| *radiance != Vec3::ZERO));

        // Resizing is not supported, even when the pixel count stays put
        let resized = Camera::new(
            vec3(0.0, 3.0, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(4, 4),
        );

        assert!(renderer.set_camera(resized).is_err());

        let reshaped = Camera::new(
            vec3(0.0, 3.0, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            uvec2(4, 16),
        );

        assert!(renderer.set_camera(reshaped).is_err());
    }
}
