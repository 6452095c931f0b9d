use crate::{eval_target_function, DiReservoir, LightSample, Scene, SpatialContext};

/// Normalization strategy applied to spatially-combined reservoirs.
///
/// Picked once, process-wide; all pixels of all frames run the same mode.
/// Every mode except [`Self::OneOverM`] is unbiased, they differ in cost and
/// variance.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BiasCorrection {
    /// `1 / sum of M` over all reused neighbors.
    ///
    /// Cheapest; darkens around geometric discontinuities since it counts
    /// neighbors that could never have produced the selected sample.
    OneOverM,

    /// `1 / sum of M` over only the neighbors whose target function for the
    /// selected sample is positive.
    #[default]
    OneOverZ,

    /// Balance-heuristic ratio of the selected sample's target functions
    /// across neighbors.
    MisLike,

    /// [`Self::MisLike`] with every per-neighbor term scaled by that
    /// neighbor's confidence.
    MisLikeConfidence,

    /// Generalized balance heuristic, folded into the per-neighbor
    /// resampling weights during combination; O(neighbors²) per pixel.
    Gbh,

    /// [`Self::Gbh`] with confidence weights.
    GbhConfidence,
}

impl BiasCorrection {
    /// Computes the resampling-MIS weight of slot `k`'s candidate `sample`
    /// during spatial combination.
    ///
    /// For the cheap modes this is just the neighbor's confidence (or a
    /// constant), resolved against the normalization afterwards; the GBH
    /// modes establish correctness right here by rating the candidate
    /// against every other neighbor's surface.
    pub fn resampling_mis_weight(
        &self,
        scene: &impl Scene,
        ctx: &SpatialContext<'_>,
        sample: &LightSample,
        k: u32,
        neighbor_idx: usize,
        use_visibility: bool,
    ) -> f32 {
        match self {
            Self::OneOverM | Self::OneOverZ => ctx.reservoirs[neighbor_idx].m,

            Self::MisLike | Self::MisLikeConfidence => 1.0,

            Self::Gbh | Self::GbhConfidence => {
                let confidence = *self == Self::GbhConfidence;

                let mut nume = 0.0;
                let mut denom = 0.0;

                for slot in 0..ctx.slots() {
                    let Some(idx) = ctx.accepted(slot) else {
                        continue;
                    };

                    let t = eval_target_function(
                        scene,
                        sample,
                        &ctx.surfaces[idx],
                        use_visibility,
                    );

                    let t = if confidence {
                        t * ctx.reservoirs[idx].m
                    } else {
                        t
                    };

                    if slot == k {
                        nume = t;
                    }

                    denom += t;
                }

                if denom > 0.0 {
                    nume / denom
                } else {
                    0.0
                }
            }
        }
    }

    /// Computes the `(numerator, denominator)` pair the combined reservoir's
    /// contribution weight gets scaled by after spatial combination.
    ///
    /// `selected_slot` is the neighbor slot whose sample survived the
    /// combination; `ctx` must be the very context the combination loop ran
    /// with, so that both enumerate identical neighbor sets.
    ///
    /// A reservoir that gathered no weight normalizes to `(1, 1)`.
    pub fn normalization(
        &self,
        scene: &impl Scene,
        ctx: &SpatialContext<'_>,
        reservoir: &DiReservoir,
        selected_slot: u32,
        use_visibility: bool,
    ) -> (f32, f32) {
        if reservoir.w_sum <= 0.0 {
            return (1.0, 1.0);
        }

        match self {
            Self::OneOverM => (1.0, reservoir.m),

            Self::OneOverZ => {
                let mut z = 0.0;

                for slot in 0..ctx.slots() {
                    let Some(idx) = ctx.accepted(slot) else {
                        continue;
                    };

                    let t = eval_target_function(
                        scene,
                        &reservoir.sample.light,
                        &ctx.surfaces[idx],
                        use_visibility,
                    );

                    if t > 0.0 {
                        z += ctx.reservoirs[idx].m;
                    }
                }

                if z > 0.0 {
                    (1.0, z)
                } else {
                    (0.0, 1.0)
                }
            }

            Self::MisLike | Self::MisLikeConfidence => {
                let confidence = *self == Self::MisLikeConfidence;

                let mut nume = 0.0;
                let mut denom = 0.0;

                for slot in 0..ctx.slots() {
                    let Some(idx) = ctx.accepted(slot) else {
                        continue;
                    };

                    let t = eval_target_function(
                        scene,
                        &reservoir.sample.light,
                        &ctx.surfaces[idx],
                        use_visibility,
                    );

                    if t <= 0.0 {
                        continue;
                    }

                    let t = if confidence {
                        t * ctx.reservoirs[idx].m
                    } else {
                        t
                    };

                    if slot == selected_slot {
                        nume = t;
                    }

                    denom += t;
                }

                if denom > 0.0 {
                    (nume, denom)
                } else {
                    (0.0, 1.0)
                }
            }

            Self::Gbh | Self::GbhConfidence => (1.0, 1.0),
        }
    }

    /// Whether combination already accounts for everything and the
    /// normalization step is a no-op.
    pub fn normalizes_during_combination(&self) -> bool {
        matches!(self, Self::Gbh | Self::GbhConfidence)
    }
}
