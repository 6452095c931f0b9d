use glam::Vec3;

use crate::{Noise, Surface};

/// Closest-hit record returned by the ray-tracing service; carries just
/// enough to build a [`Surface`] and to shade emissive geometry seen
/// directly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub base_color: Vec3,
    pub roughness: f32,
    pub emission: Vec3,
}

/// Uniformly drawn point on an emissive triangle, with area-measure density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmissiveSample {
    pub triangle_id: u32,
    pub point: Vec3,
    pub normal: Vec3,
    pub pdf_area: f32,
}

/// The capabilities the resampling kernels consume, but do not implement:
/// ray tracing, BSDF evaluation and radiance lookups.
///
/// Every method is a synchronous, side-effect-free function of its inputs -
/// kernels may call them in any per-pixel order without affecting other
/// pixels. An occluded shadow ray is an expected outcome, not an error.
pub trait Scene {
    /// Traces a ray and returns the closest hit, if any.
    fn closest_hit(&self, origin: Vec3, direction: Vec3) -> Option<SceneHit>;

    /// Returns whether anything blocks the segment from `origin` towards
    /// `direction` (unit) before `distance`.
    fn is_occluded(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool;

    /// Evaluates the BSDF response at `surface` for light arriving from
    /// `direction` (unit, pointing away from the surface).
    fn eval_bsdf(&self, surface: &Surface, direction: Vec3) -> Vec3;

    /// Radiance emitted by given emissive triangle.
    fn emission(&self, triangle_id: u32) -> Vec3;

    /// Unit geometric normal of given emissive triangle.
    fn light_normal(&self, triangle_id: u32) -> Vec3;

    /// Environment radiance arriving from `direction` (unit).
    fn env_radiance(&self, direction: Vec3) -> Vec3;

    /// Samples a point on one of the scene's emissive triangles; `None` when
    /// the scene has no emissive geometry.
    fn sample_emissive(&self, noise: &mut Noise) -> Option<EmissiveSample>;
}
