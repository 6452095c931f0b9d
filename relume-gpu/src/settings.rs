use crate::{BiasCorrection, SimilarityHeuristics};

/// Process-wide configuration of the whole resampling pipeline.
///
/// Selected once at startup and shared by every pass of every frame; nothing
/// here is per-pixel state. Validation happens when the renderer is built -
/// a bad configuration is a fatal error, never a per-pixel fallback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Global seed feeding every per-pixel random stream.
    pub seed: u32,

    /// Which normalization strategy combined reservoirs use; see
    /// [`BiasCorrection`].
    pub bias_correction: BiasCorrection,

    /// Confidence cap applied after every combination; bounds temporal lag.
    /// `0.0` disables the cap.
    pub m_cap: f32,

    pub similarity: SimilarityHeuristics,
    pub initial: InitialSettings,
    pub temporal: TemporalSettings,
    pub spatial: SpatialSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            bias_correction: BiasCorrection::default(),
            m_cap: 20.0,
            similarity: SimilarityHeuristics::default(),
            initial: InitialSettings::default(),
            temporal: TemporalSettings::default(),
            spatial: SpatialSettings::default(),
        }
    }
}

/// Configuration of the initial-candidates pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitialSettings {
    /// How many light candidates each pixel resamples per frame.
    pub light_candidates: u32,

    /// Whether candidate target functions include a visibility test.
    pub use_visibility: bool,

    /// Whether to discard occluded retained samples right after candidate
    /// generation, so that later passes resample visibility-aware inputs.
    pub visibility_reuse: bool,
}

impl Default for InitialSettings {
    fn default() -> Self {
        Self {
            light_candidates: 4,
            use_visibility: false,
            visibility_reuse: true,
        }
    }
}

/// Configuration of the temporal-reuse pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemporalSettings {
    pub enabled: bool,

    /// How many randomly jittered locations around the back-projected pixel
    /// to try (on top of the exact one) before giving up on history.
    pub max_neighbor_search_count: u32,

    /// Radius, in pixels, of the jittered history search.
    pub neighbor_search_radius: f32,

    /// Whether the history's target function, re-evaluated at the current
    /// surface, includes a visibility test.
    pub use_visibility: bool,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_neighbor_search_count: 8,
            neighbor_search_radius: 4.0,
            use_visibility: false,
        }
    }
}

/// Configuration of the spatial-reuse pass(es).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialSettings {
    /// How many spatial iterations to run; `0` disables spatial reuse.
    pub pass_count: u32,

    /// How many neighbors each pixel resamples, not counting itself.
    pub neighbor_count: u32,

    /// Radius, in pixels, of the neighbor-sampling disk.
    pub radius: f32,

    /// Whether the resampling target function (neighbor's sample at the
    /// center surface) includes a visibility test.
    pub use_visibility: bool,

    /// Whether the bias-correction target functions (the center's sample
    /// re-evaluated at neighbor surfaces) include a visibility test.
    pub bias_visibility: bool,

    /// Largest acceptable reconnection-shift jacobian; values outside
    /// `<1 / max, max>` mark the neighbor as too dissimilar to reuse.
    pub jacobian_max_ratio: f32,

    /// Under adaptive sampling, whether converged neighbors may still be
    /// reused...
    pub allow_converged_reuse: bool,

    /// ... and with what probability.
    pub converged_reuse_probability: f32,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            pass_count: 2,
            neighbor_count: 5,
            radius: 20.0,
            use_visibility: false,
            bias_visibility: true,
            jacobian_max_ratio: 20.0,
            allow_converged_reuse: false,
            converged_reuse_probability: 0.5,
        }
    }
}
