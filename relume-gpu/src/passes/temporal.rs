use crate::{
    eval_target_function, temporal_neighbor, Camera, DiReservoir,
    DiReservoirData, Noise, Scene, Settings, Surface,
};

/// Temporal-reuse pass: merges given pixel's initial-candidate reservoir
/// with the previous frame's reservoir at the reprojected location.
///
/// Both inputs participate with weight `ucw * target_function * M`, where
/// the history's target function is re-evaluated at the *current* surface;
/// afterwards the combined confidence gets capped to bound temporal lag.
/// Pixels without a usable history pass their initial reservoir through
/// unchanged.
///
/// The history buffer arrives in its packed at-rest layout; only the chosen
/// neighbor gets unpacked.
pub fn reuse_temporal(
    scene: &impl Scene,
    settings: &Settings,
    prev_camera: &Camera,
    surface: &Surface,
    prev_surfaces: &[Surface],
    prev_reservoirs: &[DiReservoirData],
    initial: DiReservoir,
    noise: &mut Noise,
) -> DiReservoir {
    if surface.is_none() {
        return initial;
    }

    let Some(idx) = temporal_neighbor(
        prev_camera,
        &settings.temporal,
        &settings.similarity,
        surface,
        prev_surfaces,
        noise,
    ) else {
        return initial;
    };

    let history = prev_reservoirs[idx].unpack();

    let mut reservoir = DiReservoir::default();

    // The initial reservoir's target function already refers to the current
    // surface, so no re-caching is needed for it
    reservoir.combine(
        noise,
        &initial,
        initial.m,
        initial.sample.target_function,
        1.0,
    );

    let history_t = eval_target_function(
        scene,
        &history.sample.light,
        surface,
        settings.temporal.use_visibility,
    );

    if reservoir.combine(noise, &history, history.m, history_t, 1.0) {
        reservoir.sample.target_function = history_t;
    }

    reservoir.finalize(reservoir.sample.target_function);
    reservoir.clamp_m(settings.m_cap);
    reservoir
}
