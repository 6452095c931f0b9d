use glam::{ivec2, vec2, IVec2, UVec2, Vec2};

use crate::{
    disk_point, hammersley_2d, Camera, DiReservoir, Noise, SimilarityHeuristics,
    Surface, TemporalSettings,
};

/// How converged pixels (under adaptive sampling) take part in spatial reuse.
#[derive(Clone, Copy)]
pub enum ConvergedGate<'a> {
    /// No adaptive sampling; every pixel is fair game.
    Off,

    /// Converged neighbors are never reused.
    Reject { converged: &'a [bool] },

    /// Converged neighbors are reused with given probability.
    Probabilistic {
        converged: &'a [bool],
        reuse_probability: f32,
    },
}

/// Returns the pixel index of the `k`-th spatial neighbor, or `None` when the
/// slot produces no reusable pixel.
///
/// The neighbor set has `count + 1` slots and the last one is always the
/// center pixel itself - every resampling loop ends by resampling its own
/// pixel. The remaining slots map Hammersley points into a disk of given
/// radius, rotated per pixel-invocation so the pattern does not alias across
/// pixels or frames; point zero of the sequence is skipped since it is the
/// origin and would just reselect the center.
///
/// `gate_noise` is taken by value on purpose: callers hold one fork per pixel
/// and hand a copy to every call, so repeated enumerations of the neighbor
/// set (combination loop, then bias-correction loops) consume identical
/// random streams and agree on which neighbors get gated out.
pub fn spatial_neighbor(
    k: u32,
    count: u32,
    radius: f32,
    center_pos: UVec2,
    screen_size: UVec2,
    rotation: Vec2,
    gate: ConvergedGate<'_>,
    mut gate_noise: Noise,
) -> Option<usize> {
    if k == count {
        return Some(pixel_idx(center_pos.as_ivec2(), screen_size));
    }

    let uv = hammersley_2d(count + 1, k + 1);
    let offset = disk_point(uv, radius);

    let offset = vec2(
        offset.x * rotation.x - offset.y * rotation.y,
        offset.x * rotation.y + offset.y * rotation.x,
    );

    // Truncation, not rounding; keeps the offset distribution symmetric
    // around the center pixel
    let pos = center_pos.as_ivec2() + ivec2(offset.x as i32, offset.y as i32);

    if pos.x < 0
        || pos.y < 0
        || pos.x >= screen_size.x as i32
        || pos.y >= screen_size.y as i32
    {
        return None;
    }

    let idx = pixel_idx(pos, screen_size);

    match gate {
        ConvergedGate::Off => Some(idx),

        ConvergedGate::Reject { converged } => {
            if converged[idx] {
                None
            } else {
                Some(idx)
            }
        }

        ConvergedGate::Probabilistic {
            converged,
            reuse_probability,
        } => {
            if gate_noise.sample() > reuse_probability && converged[idx] {
                None
            } else {
                Some(idx)
            }
        }
    }
}

fn pixel_idx(pos: IVec2, screen_size: UVec2) -> usize {
    (pos.y as usize) * (screen_size.x as usize) + (pos.x as usize)
}

/// Everything needed to enumerate one pixel's spatial neighbor set.
///
/// The combination loop and the bias-correction loops both have to walk the
/// *same* neighbors, so the enumeration lives here and both go through
/// [`Self::accepted()`] instead of re-deriving the sampling inline.
pub struct SpatialContext<'a> {
    pub center_pos: UVec2,
    pub center_idx: usize,
    pub screen_size: UVec2,
    pub neighbor_count: u32,
    pub radius: f32,

    /// `(cos, sin)` of this invocation's random disk rotation.
    pub rotation: Vec2,

    pub gate: ConvergedGate<'a>,
    pub gate_noise: Noise,
    pub similarity: SimilarityHeuristics,
    pub surfaces: &'a [Surface],
    pub reservoirs: &'a [DiReservoir],
}

impl SpatialContext<'_> {
    /// Returns the pixel index of slot `k`, after viewport, convergence and
    /// similarity gating; the center slot is always accepted.
    pub fn accepted(&self, k: u32) -> Option<usize> {
        let idx = spatial_neighbor(
            k,
            self.neighbor_count,
            self.radius,
            self.center_pos,
            self.screen_size,
            self.rotation,
            self.gate,
            self.gate_noise,
        )?;

        if idx == self.center_idx {
            return Some(idx);
        }

        let neighbor = &self.surfaces[idx];

        if neighbor.is_none() {
            return None;
        }

        if !self
            .similarity
            .check(&self.surfaces[self.center_idx], neighbor)
        {
            return None;
        }

        Some(idx)
    }

    pub fn slots(&self) -> u32 {
        self.neighbor_count + 1
    }
}

/// Finds the previous-frame pixel whose reservoir the temporal pass may
/// reuse: back-projects the current shading point through the previous
/// frame's view-projection, then probes the exact location first and up to
/// `max_neighbor_search_count` jittered ones, taking the first that passes
/// the similarity heuristics.
pub fn temporal_neighbor(
    prev_camera: &Camera,
    settings: &TemporalSettings,
    similarity: &SimilarityHeuristics,
    surface: &Surface,
    prev_surfaces: &[Surface],
    noise: &mut Noise,
) -> Option<usize> {
    let prev_pos = prev_camera.world_to_screen(surface.point)?;
    let screen_size = prev_camera.screen;

    for attempt in 0..=settings.max_neighbor_search_count {
        let offset = if attempt == 0 {
            Vec2::ZERO
        } else {
            vec2(noise.sample() - 0.5, noise.sample() - 0.5)
                * settings.neighbor_search_radius
        };

        let pos = (prev_pos + offset).round().as_ivec2();

        if pos.x < 0
            || pos.y < 0
            || pos.x >= screen_size.x as i32
            || pos.y >= screen_size.y as i32
        {
            continue;
        }

        let idx = pixel_idx(pos, screen_size);
        let prev_surface = &prev_surfaces[idx];

        if prev_surface.is_some() && similarity.check(surface, prev_surface) {
            return Some(idx);
        }
    }

    None
}
